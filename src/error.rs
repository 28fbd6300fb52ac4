//! Error types for grammar construction, table building, and parsing.

use thiserror::Error;

/// Errors raised while reading or validating a grammar.
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("grammar has no productions")]
    Empty,

    #[error("malformed grammar line {line}: {text:?}")]
    MalformedLine { line: usize, text: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while driving a built table over an input string.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("syntax error at position {position}: unexpected symbol {found}")]
    SyntaxError { position: usize, found: String },

    #[error("no GOTO entry for state {state} on {symbol}")]
    MissingGoto { state: usize, symbol: String },

    #[error("parse exceeded the step limit of {limit}; the tables are likely malformed")]
    RuntimeExceeded { limit: usize },
}

/// Non-fatal failure of the Graphviz export path. Callers log this as a
/// warning and continue; it never aborts a build or a parse.
#[derive(Error, Debug)]
#[error("visualization unavailable: {reason}")]
pub struct VisualizationError {
    pub reason: String,
}

/// Result alias for grammar construction.
pub type GrammarResult<T> = std::result::Result<T, GrammarError>;

/// Result alias for the parser driver.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
