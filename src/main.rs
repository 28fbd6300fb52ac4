//! Canonical LR(1) parser construction and execution.
//!
//! # Author
//! Juan Manuel Young Hoyos
//!
//! # References
//! Aho, Alfred V. et al. "Compilers: Principles, Techniques, and Tools" (2nd Edition).
//! Addison-Wesley, 2006.

use clap::Parser;
use lr1_parser::cli::{self, Cli};
use std::process;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
