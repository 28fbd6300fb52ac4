//! Graphviz DOT export for the canonical collection.
//!
//! We hand-write DOT text rather than depend on a graph-rendering crate,
//! the same choice `denuocc`'s grammar tool makes for its `dot` subcommand.
//! Rendering the text to an image is delegated, best-effort, to a `dot`
//! binary on `$PATH`; its absence or failure never aborts the run.

use crate::automaton::Automaton;
use crate::error::VisualizationError;
use crate::grammar::Grammar;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Renders the full automaton (every item in every state) as DOT text.
pub fn render_full(grammar: &Grammar, automaton: &Automaton) -> String {
    let mut out = String::new();
    writeln!(out, "digraph LR1Automaton {{").unwrap();
    writeln!(out, "  rankdir=LR;").unwrap();
    writeln!(out, "  node [shape=box, fontname=\"monospace\"];").unwrap();

    for state in &automaton.states {
        let mut label = format!("State {}\\n", state.id);
        for item in &state.items {
            let _ = write!(label, "{}\\n", item.render(grammar));
        }
        writeln!(out, "  s{} [label=\"{}\"];", state.id, label).unwrap();
    }

    emit_transitions(&mut out, automaton);
    writeln!(out, "}}").unwrap();
    out
}

/// Renders a simplified automaton: each state shows only its kernel items,
/// mirroring the Python original's `visualize_simplified_automaton`.
pub fn render_kernel_only(
    grammar: &Grammar,
    automaton: &Automaton,
    augmented_start: &crate::symbol::Symbol,
) -> String {
    let mut out = String::new();
    writeln!(out, "digraph LR1Automaton {{").unwrap();
    writeln!(out, "  rankdir=LR;").unwrap();
    writeln!(out, "  node [shape=box, fontname=\"monospace\"];").unwrap();

    for state in &automaton.states {
        let mut label = format!("State {}\\n", state.id);
        for item in &state.items {
            if item.is_kernel(grammar, augmented_start) {
                let _ = write!(label, "{}\\n", item.render(grammar));
            }
        }
        writeln!(out, "  s{} [label=\"{}\"];", state.id, label).unwrap();
    }

    emit_transitions(&mut out, automaton);
    writeln!(out, "}}").unwrap();
    out
}

fn emit_transitions(out: &mut String, automaton: &Automaton) {
    for state in &automaton.states {
        for (symbol, &target) in &state.transitions {
            writeln!(
                out,
                "  s{} -> s{} [label=\"{}\"];",
                state.id, target, symbol
            )
            .unwrap();
        }
    }
}

/// Writes `dot_text` to `path` and, if a `dot` binary is on `$PATH`,
/// additionally renders a PNG alongside it. Returns an error describing the
/// failure; callers should log it as a warning and continue rather than
/// propagate it as fatal.
pub fn export(dot_text: &str, path: &Path) -> Result<(), VisualizationError> {
    fs::write(path, dot_text).map_err(|e| VisualizationError {
        reason: format!("failed to write {}: {e}", path.display()),
    })?;

    let png_path = path.with_extension("png");
    let status = Command::new("dot")
        .arg("-Tpng")
        .arg(path)
        .arg("-o")
        .arg(&png_path)
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(VisualizationError {
            reason: format!("dot exited with {status}"),
        }),
        Err(e) => Err(VisualizationError {
            reason: format!("dot binary unavailable: {e}"),
        }),
    }
}
