//! FIRST and FOLLOW set computation for context-free grammars.
//!
//! Algorithms from Aho et al., "Compilers: Principles, Techniques, and
//! Tools" (2nd Edition), section 4.4. FOLLOW is diagnostic-only here: the
//! canonical LR(1) item closure computes its own per-item lookaheads from
//! FIRST of a symbol sequence and never consults FOLLOW.

use crate::grammar::Grammar;
use crate::symbol::Symbol;
use std::collections::{HashMap, HashSet};

pub type FirstSets = HashMap<Symbol, HashSet<Symbol>>;
pub type FollowSets = HashMap<Symbol, HashSet<Symbol>>;

/// Computes FIRST for every terminal and non-terminal in `grammar`.
///
/// Terminals seed as `FIRST(a) = {a}`; non-terminals start empty and grow by
/// fixed-point iteration over the productions until no set changes.
pub fn compute_first_sets(grammar: &Grammar) -> FirstSets {
    let mut first_sets: FirstSets = HashMap::new();

    for terminal in grammar.terminals() {
        first_sets.insert(terminal.clone(), HashSet::from([terminal.clone()]));
    }
    for nonterminal in grammar.nonterminals() {
        first_sets.insert(nonterminal.clone(), HashSet::new());
    }
    first_sets.insert(
        grammar.epsilon().clone(),
        HashSet::from([grammar.epsilon().clone()]),
    );

    let epsilon = grammar.epsilon().clone();

    let mut changed = true;
    while changed {
        changed = false;

        for production in grammar.productions() {
            let lhs = &production.lhs;
            let current = first_sets.get(lhs).cloned().unwrap_or_default();

            let rhs_first = first_of_string(&first_sets, &production.rhs, &epsilon);

            let merged: HashSet<Symbol> = current.union(&rhs_first).cloned().collect();
            if merged.len() != current.len() {
                first_sets.insert(lhs.clone(), merged);
                changed = true;
            }
        }
    }

    first_sets
}

/// FIRST of a symbol sequence: an empty sequence (epsilon) has FIRST = {ε}.
pub fn first_of_string(
    first_sets: &FirstSets,
    symbols: &[Symbol],
    epsilon: &Symbol,
) -> HashSet<Symbol> {
    let mut result = HashSet::new();
    let mut nullable_so_far = true;

    for symbol in symbols {
        if !nullable_so_far {
            break;
        }

        let first_of_symbol = first_sets.get(symbol).cloned().unwrap_or_default();
        for sym in &first_of_symbol {
            if sym != epsilon {
                result.insert(sym.clone());
            }
        }
        nullable_so_far = first_of_symbol.contains(epsilon);
    }

    if nullable_so_far {
        result.insert(epsilon.clone());
    }

    result
}

/// Computes FOLLOW for every non-terminal. Diagnostic only: nothing in the
/// table-building path reads these sets.
pub fn compute_follow_sets(grammar: &Grammar, first_sets: &FirstSets) -> FollowSets {
    let mut follow_sets: FollowSets = HashMap::new();
    for nonterminal in grammar.nonterminals() {
        follow_sets.insert(nonterminal.clone(), HashSet::new());
    }

    follow_sets
        .get_mut(grammar.start_symbol())
        .expect("start symbol is always a non-terminal")
        .insert(grammar.end_marker().clone());

    let epsilon = grammar.epsilon().clone();

    let mut changed = true;
    while changed {
        changed = false;

        for production in grammar.productions() {
            let lhs = &production.lhs;
            let rhs = &production.rhs;

            for (i, symbol) in rhs.iter().enumerate() {
                if !grammar.is_nonterminal(symbol) {
                    continue;
                }

                let current = follow_sets.get(symbol).cloned().unwrap_or_default();
                let mut updated = current.clone();

                let beta = &rhs[i + 1..];
                let first_beta = first_of_string(first_sets, beta, &epsilon);

                for sym in &first_beta {
                    if sym != &epsilon {
                        updated.insert(sym.clone());
                    }
                }

                if beta.is_empty() || first_beta.contains(&epsilon) {
                    let follow_lhs = follow_sets.get(lhs).cloned().unwrap_or_default();
                    updated.extend(follow_lhs);
                }

                if updated.len() != current.len() {
                    follow_sets.insert(symbol.clone(), updated);
                    changed = true;
                }
            }
        }
    }

    follow_sets
}
