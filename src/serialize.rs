//! Structured, `serde`-backed views of a built grammar/automaton/table,
//! mirroring the field-name contract `api_helper.convertir_gramatica_a_json`
//! established in the Python original, extended to the richer per-cell and
//! per-state shape the specification's external-interface section documents
//! (kernel/closure item partition, typed action/goto cells, a full trace).
//! Any future adapter (an HTTP endpoint, a different CLI) sits behind this
//! module rather than re-deriving the shape from the core types.

use crate::automaton::Automaton;
use crate::driver::{StepContext, Trace, TraceStep};
use crate::first_follow::{FirstSets, FollowSets};
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::table::{Action, Table};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Serialize)]
pub struct ProductionView {
    pub id: usize,
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
    pub rhs_str: String,
}

#[derive(Debug, Serialize)]
pub struct GrammarView {
    pub productions: Vec<ProductionView>,
}

#[derive(Debug, Serialize)]
pub struct SymbolsView {
    pub terminals: BTreeSet<Symbol>,
    pub end_marker: Symbol,
    pub non_terminals: BTreeSet<Symbol>,
    pub start_symbol: Symbol,
    pub augmented_start: Symbol,
}

#[derive(Debug, Serialize)]
pub struct FirstFollowView {
    pub first: BTreeMap<Symbol, BTreeSet<Symbol>>,
    pub follow: BTreeMap<Symbol, BTreeSet<Symbol>>,
}

/// One state of the canonical collection, with its items partitioned into
/// kernel and closure per the specification's presentation-only split: the
/// split does not affect semantics, only which items a reader sees first.
#[derive(Debug, Serialize)]
pub struct StateView {
    pub id: usize,
    pub items: Vec<String>,
    pub kernel_items: Vec<String>,
    pub closure_items: Vec<String>,
    pub is_accept: bool,
    pub num_items: usize,
}

#[derive(Debug, Serialize)]
pub struct TransitionView {
    pub from: usize,
    pub to: usize,
    pub symbol: Symbol,
}

#[derive(Debug, Serialize)]
pub struct AutomatonView {
    pub num_states: usize,
    pub states: Vec<StateView>,
    pub transitions: Vec<TransitionView>,
}

/// A single ACTION or GOTO cell, carrying both the raw value and a
/// presentation-ready `display`/`color` pair so a table-rendering frontend
/// never has to re-derive them from the action kind.
#[derive(Debug, Serialize)]
pub struct CellView {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: usize,
    pub display: String,
    pub color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production: Option<ProductionView>,
}

#[derive(Debug, Serialize)]
pub struct ParsingTableView {
    pub action: BTreeMap<String, BTreeMap<String, CellView>>,
    pub goto: BTreeMap<String, BTreeMap<String, CellView>>,
}

/// Mirrors `lr1_parser.py`'s closure-table printout: one row per state with
/// the label a reader would see under a GOTO arrow pointing at it, its
/// kernel/closure items, and the transitions it offers onward.
#[derive(Debug, Serialize)]
pub struct ClosureRowView {
    pub state_id: usize,
    pub goto_label: String,
    pub kernel_items: Vec<String>,
    pub closure_items: Vec<String>,
    pub num_items: usize,
    pub goto_transitions: Vec<TransitionView>,
}

#[derive(Debug, Serialize)]
pub struct TraceStepView {
    pub step: usize,
    pub stack: Vec<usize>,
    pub symbol_stack: Vec<Symbol>,
    pub remaining_input: Vec<Symbol>,
    pub current_state: usize,
    pub current_token: Symbol,
    pub action: &'static str,
    pub action_detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_id: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_lhs: Option<Symbol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_rhs: Option<Vec<Symbol>>,
}

#[derive(Debug, Serialize)]
pub struct TraceView {
    pub accepted: bool,
    pub steps: Vec<TraceStepView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub grammar: GrammarView,
    pub symbols: SymbolsView,
    pub first_follow: FirstFollowView,
    pub automaton: AutomatonView,
    pub parsing_table: ParsingTableView,
    pub closure_table: Vec<ClosureRowView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceView>,
}

fn production_view(grammar: &Grammar, id: usize) -> ProductionView {
    let production = grammar.production(id);
    ProductionView {
        id,
        lhs: production.lhs.clone(),
        rhs: production.rhs.clone(),
        rhs_str: if production.rhs.is_empty() {
            grammar.epsilon().to_string()
        } else {
            crate::symbol::join_symbols(&production.rhs)
        },
    }
}

fn action_cell(grammar: &Grammar, action: &Action) -> CellView {
    match action {
        Action::Shift(target) => CellView {
            kind: "shift",
            value: *target,
            display: action.to_string(),
            color: "blue",
            production: None,
        },
        Action::Reduce(production_id) => CellView {
            kind: "reduce",
            value: *production_id,
            display: action.to_string(),
            color: "green",
            production: Some(production_view(grammar, *production_id)),
        },
        Action::Accept => CellView {
            kind: "accept",
            value: 0,
            display: action.to_string(),
            color: "gold",
            production: None,
        },
    }
}

fn goto_cell(target: usize) -> CellView {
    CellView {
        kind: "goto",
        value: target,
        display: target.to_string(),
        color: "gray",
        production: None,
    }
}

fn state_view(grammar: &Grammar, augmented_start: &Symbol, state: &crate::automaton::State) -> StateView {
    let mut kernel_items = Vec::new();
    let mut closure_items = Vec::new();
    let mut is_accept = false;

    for item in &state.items {
        let rendered = item.render(grammar);
        if item.is_kernel(grammar, augmented_start) {
            kernel_items.push(rendered);
        } else {
            closure_items.push(rendered);
        }
        if item.is_reduce(grammar) && &grammar.production(item.production).lhs == augmented_start {
            is_accept = true;
        }
    }

    StateView {
        id: state.id,
        items: state.items.iter().map(|item| item.render(grammar)).collect(),
        num_items: state.items.len(),
        kernel_items,
        closure_items,
        is_accept,
    }
}

/// Assembles the full structured report for one built grammar. `trace` is
/// `None` when the caller only wants the static build artifacts.
#[allow(clippy::too_many_arguments)]
pub fn build_report(
    grammar: &Grammar,
    original_start: &Symbol,
    augmented_start: &Symbol,
    first_sets: &FirstSets,
    follow_sets: &FollowSets,
    automaton: &Automaton,
    table: &Table,
    trace: Option<&Trace>,
    accepted: Option<bool>,
    error: Option<String>,
) -> Report {
    let productions = (0..grammar.productions().len())
        .map(|id| production_view(grammar, id))
        .collect();

    // User non-terminals only: `grammar` here is the augmented grammar, so
    // its own non-terminal set includes the synthetic `augmented_start`.
    let user_nonterminals: BTreeSet<Symbol> = grammar
        .sorted_nonterminals()
        .into_iter()
        .filter(|n| n != augmented_start)
        .collect();

    let symbols = SymbolsView {
        terminals: grammar
            .sorted_terminals()
            .into_iter()
            .filter(|t| t != grammar.end_marker())
            .collect(),
        end_marker: grammar.end_marker().clone(),
        non_terminals: user_nonterminals.clone(),
        start_symbol: original_start.clone(),
        augmented_start: augmented_start.clone(),
    };

    // `first_sets`/`follow_sets` are keyed by every symbol the augmented
    // grammar touches (terminals, `ε`, `augmented_start`); the exported
    // contract is per *user* non-terminal only.
    let first = user_nonterminals
        .iter()
        .map(|n| {
            (
                n.clone(),
                first_sets.get(n).cloned().unwrap_or_default(),
            )
        })
        .collect();
    let follow = user_nonterminals
        .iter()
        .map(|n| {
            (
                n.clone(),
                follow_sets.get(n).cloned().unwrap_or_default(),
            )
        })
        .collect();

    let states: Vec<StateView> = automaton
        .states
        .iter()
        .map(|state| state_view(grammar, augmented_start, state))
        .collect();

    let mut transitions = Vec::new();
    for state in &automaton.states {
        for (symbol, &to) in &state.transitions {
            transitions.push(TransitionView {
                from: state.id,
                symbol: symbol.clone(),
                to,
            });
        }
    }

    let mut action: BTreeMap<String, BTreeMap<String, CellView>> = BTreeMap::new();
    for ((state, terminal), act) in &table.action {
        action
            .entry(state.to_string())
            .or_default()
            .insert(terminal.to_string(), action_cell(grammar, act));
    }

    let mut goto: BTreeMap<String, BTreeMap<String, CellView>> = BTreeMap::new();
    for ((state, nonterminal), &target) in &table.goto {
        goto.entry(state.to_string())
            .or_default()
            .insert(nonterminal.to_string(), goto_cell(target));
    }

    let closure_table: Vec<ClosureRowView> = automaton
        .states
        .iter()
        .zip(&states)
        .map(|(state, view)| {
            let incoming: Vec<String> = automaton
                .states
                .iter()
                .flat_map(|s| {
                    s.transitions
                        .iter()
                        .filter(move |&(_, &to)| to == state.id)
                        .map(move |(symbol, _)| format!("goto({}, {})", s.id, symbol))
                })
                .collect();
            let goto_label = if incoming.is_empty() {
                if state.id == 0 {
                    "INITIAL".to_string()
                } else {
                    String::new()
                }
            } else {
                incoming.join(", ")
            };

            let goto_transitions = state
                .transitions
                .iter()
                .map(|(symbol, &to)| TransitionView {
                    from: state.id,
                    symbol: symbol.clone(),
                    to,
                })
                .collect();

            ClosureRowView {
                state_id: state.id,
                goto_label,
                kernel_items: view.kernel_items.clone(),
                closure_items: view.closure_items.clone(),
                num_items: view.num_items,
                goto_transitions,
            }
        })
        .collect();

    let trace_view = trace.map(|trace| TraceView {
        accepted: accepted.unwrap_or(false),
        steps: trace.steps.iter().map(trace_step_view).collect(),
        error,
    });

    Report {
        grammar: GrammarView { productions },
        symbols,
        first_follow: FirstFollowView { first, follow },
        automaton: AutomatonView {
            num_states: automaton.states.len(),
            states,
            transitions,
        },
        parsing_table: ParsingTableView { action, goto },
        closure_table,
        trace: trace_view,
    }
}

fn trace_step_view(step: &TraceStep) -> TraceStepView {
    fn base(context: &StepContext) -> (usize, Vec<usize>, Vec<Symbol>, Vec<Symbol>, usize, Symbol) {
        (
            context.step,
            context.state_stack.clone(),
            context.symbol_stack.clone(),
            context.remaining_input.clone(),
            context.current_state,
            context.current_token.clone(),
        )
    }

    match step {
        TraceStep::Shift { context, next_state } => {
            let (step, stack, symbol_stack, remaining_input, current_state, current_token) =
                base(context);
            TraceStepView {
                step,
                stack,
                symbol_stack,
                remaining_input,
                current_state,
                current_token,
                action: "shift",
                action_detail: format!("s{next_state}"),
                production_id: None,
                production_lhs: None,
                production_rhs: None,
            }
        }
        TraceStep::Reduce {
            context,
            production,
            goto_state,
            ..
        } => {
            let (step, stack, symbol_stack, remaining_input, current_state, current_token) =
                base(context);
            TraceStepView {
                step,
                stack,
                symbol_stack,
                remaining_input,
                current_state,
                current_token,
                action: "reduce",
                action_detail: format!("r{production} (goto {goto_state})"),
                production_id: Some(*production),
                production_lhs: None,
                production_rhs: None,
            }
        }
        TraceStep::Accept { context } => {
            let (step, stack, symbol_stack, remaining_input, current_state, current_token) =
                base(context);
            TraceStepView {
                step,
                stack,
                symbol_stack,
                remaining_input,
                current_state,
                current_token,
                action: "accept",
                action_detail: "acc".to_string(),
                production_id: None,
                production_lhs: None,
                production_rhs: None,
            }
        }
        TraceStep::Error { context, message } => {
            let (step, stack, symbol_stack, remaining_input, current_state, current_token) =
                base(context);
            TraceStepView {
                step,
                stack,
                symbol_stack,
                remaining_input,
                current_state,
                current_token,
                action: "error",
                action_detail: message.clone(),
                production_id: None,
                production_lhs: None,
                production_rhs: None,
            }
        }
    }
}

/// Fills in `production_lhs`/`production_rhs` for reduce steps, requiring a
/// grammar reference the trace steps themselves don't carry.
pub fn annotate_productions(grammar: &Grammar, view: &mut TraceView) {
    for step in &mut view.steps {
        if let Some(id) = step.production_id {
            let production = grammar.production(id);
            step.production_lhs = Some(production.lhs.clone());
            step.production_rhs = Some(production.rhs.clone());
        }
    }
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first_follow::{compute_first_sets, compute_follow_sets};

    fn build(source: &str) -> Report {
        let grammar = Grammar::parse_source(source).unwrap();
        let augmented = grammar.augment();
        let first_sets = compute_first_sets(&augmented.grammar);
        let follow_sets = compute_follow_sets(&augmented.grammar, &first_sets);
        let automaton =
            Automaton::build(&augmented.grammar, &first_sets, &augmented.augmented_start);
        let (table, _conflicts) =
            Table::build(&augmented.grammar, &automaton, &augmented.augmented_start);
        build_report(
            &augmented.grammar,
            &augmented.original_start,
            &augmented.augmented_start,
            &first_sets,
            &follow_sets,
            &automaton,
            &table,
            None,
            None,
            None,
        )
    }

    // `S -> C C; C -> c C; C -> d` (specification scenario 1).
    fn scenario_one() -> Report {
        build("S -> C C\nC -> c C\nC -> d\n")
    }

    #[test]
    fn start_symbol_is_the_user_start_not_the_augmented_one() {
        let report = scenario_one();
        assert_eq!(report.symbols.start_symbol, Symbol::new("S"));
        assert_eq!(report.symbols.augmented_start, Symbol::new("S'"));
        assert_ne!(report.symbols.start_symbol, report.symbols.augmented_start);
    }

    #[test]
    fn non_terminals_exclude_the_augmented_start() {
        let report = scenario_one();
        assert_eq!(
            report.symbols.non_terminals,
            BTreeSet::from([Symbol::new("S"), Symbol::new("C")])
        );
        assert!(!report.symbols.non_terminals.contains(&Symbol::new("S'")));
    }

    #[test]
    fn first_follow_keys_are_exactly_the_user_non_terminals() {
        let report = scenario_one();
        let expected: BTreeSet<Symbol> = BTreeSet::from([Symbol::new("S"), Symbol::new("C")]);
        let first_keys: BTreeSet<Symbol> = report.first_follow.first.keys().cloned().collect();
        let follow_keys: BTreeSet<Symbol> = report.first_follow.follow.keys().cloned().collect();
        assert_eq!(first_keys, expected);
        assert_eq!(follow_keys, expected);
        assert!(!report.first_follow.first.contains_key(&Symbol::new("S'")));
        assert!(!report.first_follow.first.contains_key(&Symbol::new("c")));
        assert!(!report.first_follow.first.contains_key(&Symbol::new("ε")));
    }
}
