//! Command-line frontend: reads a grammar, builds its canonical LR(1)
//! tables, prints the requested artifacts, and drives any input strings
//! through the parser.

use crate::automaton::Automaton;
use crate::driver;
use crate::error::GrammarError;
use crate::first_follow::{compute_first_sets, compute_follow_sets};
use crate::grammar::Grammar;
use crate::serialize::build_report;
use crate::symbol::split_symbols;
use crate::table::Table;
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum EmitFormat {
    Text,
    Json,
}

/// Build a canonical LR(1) parser from a grammar and drive it over input
/// strings, printing the grammar, FIRST/FOLLOW sets, automaton, and parsing
/// table along the way.
#[derive(Debug, Parser)]
#[command(name = "lr1_parser", version, about)]
pub struct Cli {
    /// Path to a grammar source file, or `-` to read from stdin.
    pub grammar: PathBuf,

    /// Input strings to drive through the parser (whitespace-separated
    /// tokens each).
    #[arg(short, long = "input")]
    pub inputs: Vec<String>,

    #[arg(long)]
    pub first_follow: bool,

    #[arg(long)]
    pub automaton: bool,

    #[arg(long)]
    pub table: bool,

    #[arg(long)]
    pub closure_table: bool,

    #[arg(long)]
    pub trace: bool,

    #[arg(long, value_enum, default_value_t = EmitFormat::Text)]
    pub emit: EmitFormat,

    /// Write a Graphviz DOT file (and, best-effort, a rendered PNG) here.
    #[arg(long)]
    pub dot: Option<PathBuf>,
}

pub fn run(cli: Cli) -> Result<(), AppError> {
    let source = read_source(&cli.grammar)?;
    let grammar = Grammar::parse_source(&source)?;

    log::info!(
        "grammar loaded: {} productions, {} terminals, {} nonterminals",
        grammar.productions().len(),
        grammar.terminals().len(),
        grammar.nonterminals().len()
    );

    let augmented = grammar.augment();
    let first_sets = compute_first_sets(&augmented.grammar);
    let follow_sets = compute_follow_sets(&augmented.grammar, &first_sets);
    let automaton = Automaton::build(&augmented.grammar, &first_sets, &augmented.augmented_start);
    let (table, conflicts) = Table::build(&augmented.grammar, &automaton, &augmented.augmented_start);

    log::info!("canonical collection has {} states", automaton.states.len());
    for conflict in &conflicts {
        log::warn!(
            "conflict in state {} on {}: {} vs {}",
            conflict.state,
            conflict.terminal,
            conflict.existing,
            conflict.proposed
        );
    }

    if let Some(dot_path) = &cli.dot {
        let dot_text = crate::dot::render_full(&augmented.grammar, &automaton);
        if let Err(e) = crate::dot::export(&dot_text, dot_path) {
            log::warn!("{e}");
        }
    }

    match cli.emit {
        EmitFormat::Text => print_text_report(&cli, &augmented.grammar, &first_sets, &follow_sets, &automaton, &table, &conflicts),
        EmitFormat::Json => {
            let first_input = cli.inputs.first();
            let outcome = first_input.map(|input| {
                driver::parse(&augmented.grammar, &table, &split_symbols(input))
            });

            let mut report = build_report(
                &augmented.grammar,
                &augmented.original_start,
                &augmented.augmented_start,
                &first_sets,
                &follow_sets,
                &automaton,
                &table,
                outcome.as_ref().map(|o| &o.trace),
                outcome.as_ref().map(|o| o.accepted),
                outcome.as_ref().and_then(|o| o.error.as_ref().map(|e| e.to_string())),
            );
            if let Some(view) = report.trace.as_mut() {
                crate::serialize::annotate_productions(&augmented.grammar, view);
            }
            println!("{}", report.to_json()?);
        }
    }

    for input in &cli.inputs {
        let tokens = split_symbols(input);
        let outcome = driver::parse(&augmented.grammar, &table, &tokens);
        if outcome.accepted {
            println!("accept: {input:?}");
            if cli.trace {
                for step in &outcome.trace.steps {
                    println!("  {step:?}");
                }
            }
        } else {
            let reason = outcome
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            println!("reject: {input:?} ({reason})");
        }
    }

    Ok(())
}

fn read_source(path: &PathBuf) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

#[allow(clippy::too_many_arguments)]
fn print_text_report(
    cli: &Cli,
    grammar: &Grammar,
    first_sets: &crate::first_follow::FirstSets,
    follow_sets: &crate::first_follow::FollowSets,
    automaton: &Automaton,
    table: &Table,
    conflicts: &[crate::table::Conflict],
) {
    println!("== Grammar ==");
    print!("{grammar}");

    if cli.first_follow {
        println!("== FIRST/FOLLOW ==");
        for nonterminal in grammar.sorted_nonterminals() {
            let first = first_sets.get(&nonterminal).cloned().unwrap_or_default();
            let follow = follow_sets.get(&nonterminal).cloned().unwrap_or_default();
            println!("FIRST({nonterminal}) = {first:?}");
            println!("FOLLOW({nonterminal}) = {follow:?}");
        }
    }

    if cli.automaton || cli.closure_table {
        println!("== Canonical collection ({} states) ==", automaton.states.len());
        for state in &automaton.states {
            println!("State {}:", state.id);
            for item in &state.items {
                println!("  {}", item.render(grammar));
            }
        }
    }

    if cli.table {
        println!("== ACTION/GOTO table ==");
        for ((state, terminal), action) in &table.action {
            println!("ACTION[{state}, {terminal}] = {action}");
        }
        for ((state, nonterminal), target) in &table.goto {
            println!("GOTO[{state}, {nonterminal}] = {target}");
        }
        if !conflicts.is_empty() {
            println!("-- {} conflict(s) --", conflicts.len());
            for conflict in conflicts {
                println!(
                    "state {} on {}: kept {}, discarded {}",
                    conflict.state, conflict.terminal, conflict.existing, conflict.proposed
                );
            }
        }
    }
}
