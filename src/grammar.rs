//! Grammar storage: productions, derived symbol sets, and the grammar text
//! format reader.
//!
//! A grammar is supplied as plain text, one production per line. Symbol
//! roles (terminal vs. non-terminal) are never declared; they are derived
//! from where each symbol occurs (see [`Grammar::classify`]).

use crate::error::{GrammarError, GrammarResult};
use crate::symbol::{join_symbols, split_symbols, Symbol};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// A single production `lhs -> rhs`. An empty `rhs` denotes epsilon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(lhs: Symbol, rhs: Vec<Symbol>) -> Self {
        Self { lhs, rhs }
    }

    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rhs.is_empty() {
            write!(f, "{} → ε", self.lhs)
        } else {
            write!(f, "{} → {}", self.lhs, join_symbols(&self.rhs))
        }
    }
}

/// A context-free grammar: an ordered list of productions plus the derived
/// terminal/non-terminal split, the start symbol, and the epsilon/end-marker
/// spellings used throughout analysis.
#[derive(Debug, Clone)]
pub struct Grammar {
    productions: Vec<Production>,
    nonterminals: HashSet<Symbol>,
    terminals: HashSet<Symbol>,
    start_symbol: Symbol,
    epsilon: Symbol,
    end_marker: Symbol,
    production_map: HashMap<Symbol, Vec<usize>>,
}

impl Grammar {
    /// Builds a grammar from an ordered list of productions. The start
    /// symbol is the LHS of the first production, per convention.
    pub fn from_productions(productions: Vec<Production>) -> GrammarResult<Self> {
        Self::from_productions_with_markers(productions, Symbol::new("ε"), Symbol::new("$"))
    }

    pub fn from_productions_with_markers(
        productions: Vec<Production>,
        epsilon: Symbol,
        end_marker: Symbol,
    ) -> GrammarResult<Self> {
        if productions.is_empty() {
            return Err(GrammarError::Empty);
        }

        let start_symbol = productions[0].lhs.clone();

        let mut production_map: HashMap<Symbol, Vec<usize>> = HashMap::new();
        for (index, prod) in productions.iter().enumerate() {
            production_map.entry(prod.lhs.clone()).or_default().push(index);
        }

        let mut grammar = Self {
            productions,
            nonterminals: HashSet::new(),
            terminals: HashSet::new(),
            start_symbol,
            epsilon,
            end_marker,
            production_map,
        };
        grammar.classify();
        Ok(grammar)
    }

    /// Reads the grammar text format: one production per line, blank lines
    /// and `#`-prefixed comments ignored, `lhs -> rhs` or `lhs : rhs` (the
    /// first of `->`/`:` encountered wins as the separator), RHS symbols
    /// whitespace-separated. An RHS that is empty, the literal `epsilon`
    /// (case-insensitive), or `ε` denotes the empty sequence.
    pub fn parse_source(text: &str) -> GrammarResult<Self> {
        let mut productions = Vec::new();

        for (offset, raw_line) in text.lines().enumerate() {
            let line_number = offset + 1;
            let line = match raw_line.find('#') {
                Some(idx) => &raw_line[..idx],
                None => raw_line,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (lhs_str, rhs_str) = Self::split_separator(line).ok_or_else(|| {
                GrammarError::MalformedLine {
                    line: line_number,
                    text: raw_line.to_string(),
                }
            })?;

            let lhs_str = lhs_str.trim();
            if lhs_str.is_empty() {
                return Err(GrammarError::MalformedLine {
                    line: line_number,
                    text: raw_line.to_string(),
                });
            }

            let rhs_str = rhs_str.trim();
            let rhs = if rhs_str.is_empty()
                || rhs_str.eq_ignore_ascii_case("epsilon")
                || rhs_str == "ε"
            {
                Vec::new()
            } else {
                split_symbols(rhs_str)
            };

            productions.push(Production::new(Symbol::new(lhs_str), rhs));
        }

        Self::from_productions(productions)
    }

    fn split_separator(line: &str) -> Option<(&str, &str)> {
        let arrow = line.find("->");
        let colon = line.find(':');
        let at = match (arrow, colon) {
            (Some(a), Some(c)) => Some(a.min(c)),
            (Some(a), None) => Some(a),
            (None, Some(c)) => Some(c),
            (None, None) => None,
        }?;
        let sep_len = if line[at..].starts_with("->") { 2 } else { 1 };
        Some((&line[..at], &line[at + sep_len..]))
    }

    /// Re-derives the terminal/non-terminal sets from the production list.
    /// Idempotent: every LHS symbol is a non-terminal; every RHS symbol not
    /// also appearing as some LHS and not the epsilon marker is a terminal;
    /// the end marker is always a terminal even though it never appears in
    /// any written rhs, since FIRST-of-sequence (closure's lookahead
    /// computation) needs `FIRST($) = {$}` seeded for every item whose
    /// lookahead carries through to the end of input.
    pub fn classify(&mut self) {
        let nonterminals: HashSet<Symbol> =
            self.productions.iter().map(|p| p.lhs.clone()).collect();

        let mut terminals = HashSet::new();
        for prod in &self.productions {
            for sym in &prod.rhs {
                if sym != &self.epsilon && !nonterminals.contains(sym) {
                    terminals.insert(sym.clone());
                }
            }
        }
        terminals.insert(self.end_marker.clone());

        self.nonterminals = nonterminals;
        self.terminals = terminals;
    }

    pub fn add_production(&mut self, production: Production) {
        let index = self.productions.len();
        self.production_map
            .entry(production.lhs.clone())
            .or_default()
            .push(index);
        self.productions.push(production);
        self.classify();
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn productions_for(&self, nonterminal: &Symbol) -> impl Iterator<Item = usize> + '_ {
        self.production_map
            .get(nonterminal)
            .into_iter()
            .flatten()
            .copied()
    }

    pub fn nonterminals(&self) -> &HashSet<Symbol> {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &HashSet<Symbol> {
        &self.terminals
    }

    pub fn is_nonterminal(&self, symbol: &Symbol) -> bool {
        self.nonterminals.contains(symbol)
    }

    pub fn is_terminal(&self, symbol: &Symbol) -> bool {
        self.terminals.contains(symbol)
    }

    pub fn start_symbol(&self) -> &Symbol {
        &self.start_symbol
    }

    pub fn epsilon(&self) -> &Symbol {
        &self.epsilon
    }

    pub fn end_marker(&self) -> &Symbol {
        &self.end_marker
    }

    /// Sorted view of the terminal set, for deterministic diagnostic output.
    pub fn sorted_terminals(&self) -> BTreeSet<Symbol> {
        self.terminals.iter().cloned().collect()
    }

    /// Sorted view of the non-terminal set, for deterministic diagnostic output.
    pub fn sorted_nonterminals(&self) -> BTreeSet<Symbol> {
        self.nonterminals.iter().cloned().collect()
    }

    /// Builds the augmented grammar `S' -> S` used by the automaton builder.
    /// The fresh start symbol appends `'` to the original start symbol until
    /// the result is not already in use.
    pub fn augment(&self) -> AugmentedGrammar {
        let mut augmented_name = format!("{}'", self.start_symbol);
        while self.nonterminals.contains(&Symbol::new(augmented_name.as_str()))
            || self.terminals.contains(&Symbol::new(augmented_name.as_str()))
        {
            augmented_name.push('\'');
        }
        let augmented_start = Symbol::new(augmented_name);

        let mut productions = self.productions.clone();
        productions.insert(
            0,
            Production::new(augmented_start.clone(), vec![self.start_symbol.clone()]),
        );

        let mut grammar = Grammar::from_productions_with_markers(
            productions,
            self.epsilon.clone(),
            self.end_marker.clone(),
        )
        .expect("augmenting a non-empty grammar cannot produce an empty one");
        grammar.start_symbol = augmented_start.clone();

        AugmentedGrammar {
            grammar,
            augmented_start,
            original_start: self.start_symbol.clone(),
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for prod in &self.productions {
            writeln!(f, "{}", prod)?;
        }
        Ok(())
    }
}

/// A grammar with its synthetic start production prepended, plus the names
/// needed to tell the synthetic production apart from user-written ones.
#[derive(Debug, Clone)]
pub struct AugmentedGrammar {
    pub grammar: Grammar,
    pub augmented_start: Symbol,
    pub original_start: Symbol,
}
