//! ACTION/GOTO table construction from a built canonical collection.
//!
//! Conflicts are non-fatal: the first action assigned to an (state,
//! terminal) cell wins, and every later attempt to assign a different
//! action to the same cell is recorded in the returned conflict list
//! instead of aborting the build.

use crate::automaton::Automaton;
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{state}"),
            Action::Reduce(production) => write!(f, "r{production}"),
            Action::Accept => write!(f, "acc"),
        }
    }
}

/// An attempt to assign a second action to an already-occupied ACTION cell.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Conflict {
    pub state: usize,
    pub terminal: Symbol,
    pub existing: Action,
    pub proposed: Action,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub action: BTreeMap<(usize, Symbol), Action>,
    pub goto: BTreeMap<(usize, Symbol), usize>,
}

impl Table {
    /// Builds the ACTION/GOTO tables from `automaton`. Reduce lookaheads
    /// come from each item's own lookahead (computed during closure), never
    /// from FOLLOW.
    pub fn build(
        grammar: &Grammar,
        automaton: &Automaton,
        augmented_start: &Symbol,
    ) -> (Table, Vec<Conflict>) {
        let mut table = Table::default();
        let mut conflicts = Vec::new();

        for state in &automaton.states {
            for (symbol, &target) in &state.transitions {
                if grammar.is_terminal(symbol) {
                    table.set_action(
                        state.id,
                        symbol.clone(),
                        Action::Shift(target),
                        &mut conflicts,
                    );
                } else {
                    table.goto.insert((state.id, symbol.clone()), target);
                }
            }

            for item in &state.items {
                if !item.is_reduce(grammar) {
                    continue;
                }
                let production = grammar.production(item.production);
                if &production.lhs == augmented_start {
                    table.set_action(
                        state.id,
                        grammar.end_marker().clone(),
                        Action::Accept,
                        &mut conflicts,
                    );
                } else {
                    table.set_action(
                        state.id,
                        item.lookahead.clone(),
                        Action::Reduce(item.production),
                        &mut conflicts,
                    );
                }
            }
        }

        (table, conflicts)
    }

    fn set_action(
        &mut self,
        state: usize,
        terminal: Symbol,
        action: Action,
        conflicts: &mut Vec<Conflict>,
    ) {
        match self.action.entry((state, terminal.clone())) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(action);
            }
            std::collections::btree_map::Entry::Occupied(slot) => {
                if slot.get() != &action {
                    conflicts.push(Conflict {
                        state,
                        terminal,
                        existing: slot.get().clone(),
                        proposed: action,
                    });
                }
            }
        }
    }

    pub fn action(&self, state: usize, terminal: &Symbol) -> Option<&Action> {
        self.action.get(&(state, terminal.clone()))
    }

    pub fn goto(&self, state: usize, nonterminal: &Symbol) -> Option<usize> {
        self.goto.get(&(state, nonterminal.clone())).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first_follow::compute_first_sets;
    use crate::grammar::Grammar;

    fn build_arithmetic() -> (Grammar, Automaton, Symbol) {
        let grammar = Grammar::parse_source(
            "E -> E + T\n\
             E -> T\n\
             T -> T * F\n\
             T -> F\n\
             F -> ( E )\n\
             F -> id\n",
        )
        .unwrap();
        let augmented = grammar.augment();
        let first_sets = compute_first_sets(&augmented.grammar);
        let automaton =
            Automaton::build(&augmented.grammar, &first_sets, &augmented.augmented_start);
        (augmented.grammar, automaton, augmented.augmented_start)
    }

    #[test]
    fn arithmetic_grammar_builds_without_conflicts() {
        let (grammar, automaton, augmented_start) = build_arithmetic();
        let (_, conflicts) = Table::build(&grammar, &automaton, &augmented_start);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn accept_action_is_present_on_end_marker() {
        let (grammar, automaton, augmented_start) = build_arithmetic();
        let (table, _) = Table::build(&grammar, &automaton, &augmented_start);
        let has_accept = table
            .action
            .values()
            .any(|action| action == &Action::Accept);
        assert!(has_accept);
    }

    #[test]
    fn ambiguous_grammar_records_a_conflict() {
        let grammar = Grammar::parse_source(
            "S -> a A\n\
             S -> a B\n\
             A -> c\n\
             B -> c\n",
        )
        .unwrap();
        let augmented = grammar.augment();
        let first_sets = compute_first_sets(&augmented.grammar);
        let automaton =
            Automaton::build(&augmented.grammar, &first_sets, &augmented.augmented_start);
        let (_, conflicts) = Table::build(&augmented.grammar, &automaton, &augmented.augmented_start);
        assert!(!conflicts.is_empty());
    }
}
