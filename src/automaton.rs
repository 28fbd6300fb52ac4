//! The canonical LR(1) collection: closure, goto, and the worklist-driven
//! state discovery that builds it.

use crate::first_follow::{first_of_string, FirstSets};
use crate::grammar::Grammar;
use crate::item::Item;
use crate::symbol::Symbol;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub type ItemSet = BTreeSet<Item>;

/// A single state of the canonical collection: its item set (kernel plus
/// every item the closure adds) and its outgoing transitions by symbol.
#[derive(Debug, Clone)]
pub struct State {
    pub id: usize,
    pub items: ItemSet,
    pub transitions: BTreeMap<Symbol, usize>,
}

/// The canonical LR(1) automaton: states in discovery order, indexed by
/// their item set so repeated closures collapse onto existing states.
#[derive(Debug, Clone)]
pub struct Automaton {
    pub states: Vec<State>,
}

impl Automaton {
    /// Computes the closure of `items`: repeatedly, for every item with the
    /// dot before a non-terminal `B`, add `[B -> .gamma, b]` for each
    /// production of `B` and each `b` in FIRST(rest-of-item + lookahead).
    /// Lookaheads are always derived from FIRST here; FOLLOW is never
    /// consulted.
    pub fn closure(grammar: &Grammar, first_sets: &FirstSets, items: ItemSet) -> ItemSet {
        let epsilon = grammar.epsilon().clone();
        let mut closure = items;
        let mut frontier: Vec<Item> = closure.iter().cloned().collect();

        while let Some(item) = frontier.pop() {
            let Some(symbol) = item.symbol_after_dot(grammar) else {
                continue;
            };
            if !grammar.is_nonterminal(symbol) {
                continue;
            }
            let symbol = symbol.clone();

            let mut lookahead_seed = item.rest_after_dot(grammar).to_vec();
            lookahead_seed.push(item.lookahead.clone());
            let lookaheads = first_of_string(first_sets, &lookahead_seed, &epsilon);

            for production_index in grammar.productions_for(&symbol) {
                for lookahead in &lookaheads {
                    if lookahead == &epsilon {
                        continue;
                    }
                    let new_item = Item::new(production_index, 0, lookahead.clone());
                    if closure.insert(new_item.clone()) {
                        frontier.push(new_item);
                    }
                }
            }
        }

        closure
    }

    /// GOTO(items, X): advance every item whose next symbol is `X`, then
    /// close the result.
    pub fn goto(
        grammar: &Grammar,
        first_sets: &FirstSets,
        items: &ItemSet,
        symbol: &Symbol,
    ) -> ItemSet {
        let moved: ItemSet = items
            .iter()
            .filter(|item| item.symbol_after_dot(grammar) == Some(symbol))
            .map(Item::advance)
            .collect();
        Self::closure(grammar, first_sets, moved)
    }

    /// Builds the canonical collection for `augmented_start` starting from
    /// the augmented grammar's sole production (`S' -> . S, $`), discovering
    /// new states with a worklist until no GOTO produces an unseen item set.
    pub fn build(grammar: &Grammar, first_sets: &FirstSets, augmented_start: &Symbol) -> Self {
        let start_production = grammar
            .productions_for(augmented_start)
            .next()
            .expect("augmented grammar always has exactly one production for its fresh start symbol");
        let initial = Self::closure(
            grammar,
            first_sets,
            ItemSet::from([Item::new(start_production, 0, grammar.end_marker().clone())]),
        );

        let mut index_of: HashMap<ItemSet, usize> = HashMap::new();
        let mut states: Vec<State> = Vec::new();

        index_of.insert(initial.clone(), 0);
        states.push(State {
            id: 0,
            items: initial,
            transitions: BTreeMap::new(),
        });

        let mut worklist = vec![0usize];
        while let Some(state_id) = worklist.pop() {
            let items = states[state_id].items.clone();

            let mut next_symbols: BTreeSet<Symbol> = BTreeSet::new();
            for item in &items {
                if let Some(symbol) = item.symbol_after_dot(grammar) {
                    next_symbols.insert(symbol.clone());
                }
            }

            for symbol in next_symbols {
                let target_items = Self::goto(grammar, first_sets, &items, &symbol);
                if target_items.is_empty() {
                    continue;
                }

                let target_id = match index_of.get(&target_items) {
                    Some(&id) => id,
                    None => {
                        let id = states.len();
                        index_of.insert(target_items.clone(), id);
                        states.push(State {
                            id,
                            items: target_items,
                            transitions: BTreeMap::new(),
                        });
                        worklist.push(id);
                        id
                    }
                };

                states[state_id].transitions.insert(symbol, target_id);
            }
        }

        Automaton { states }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first_follow::compute_first_sets;

    fn arithmetic_automaton() -> Automaton {
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
        Automaton::build(&augmented.grammar, &first_sets, &augmented.augmented_start)
    }

    #[test]
    fn initial_state_contains_the_augmented_kernel_item() {
        let automaton = arithmetic_automaton();
        assert!(!automaton.states.is_empty());
        let kernel = &automaton.states[0].items;
        assert!(kernel.iter().any(|item| item.production == 0 && item.dot == 0));
    }

    #[test]
    fn states_are_structurally_deduplicated() {
        let automaton = arithmetic_automaton();
        let mut seen = BTreeSet::new();
        for state in &automaton.states {
            assert!(seen.insert(state.items.clone()), "duplicate state item set");
        }
    }

    #[test]
    fn every_transition_points_at_a_real_state() {
        let automaton = arithmetic_automaton();
        let state_count = automaton.states.len();
        for state in &automaton.states {
            for &target in state.transitions.values() {
                assert!(target < state_count);
            }
        }
    }
}
