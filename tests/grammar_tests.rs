//! Integration tests for the grammar module and its text format.

use lr1_parser::grammar::Grammar;
use lr1_parser::Symbol;

#[test]
fn parses_multi_character_symbols() {
    let grammar = Grammar::parse_source("stmt -> IDENT ASSIGN expr\nexpr -> IDENT\n").unwrap();
    assert_eq!(grammar.productions().len(), 2);
    assert!(grammar.is_nonterminal(&Symbol::new("stmt")));
    assert!(grammar.is_terminal(&Symbol::new("ASSIGN")));
}

#[test]
fn each_line_is_one_production() {
    let grammar = Grammar::parse_source("S -> a\nS -> b\nS -> c\n").unwrap();
    assert_eq!(grammar.productions().len(), 3);
    assert_eq!(grammar.productions_for(&Symbol::new("S")).count(), 3);
}

#[test]
fn empty_source_is_an_error() {
    assert!(Grammar::parse_source("").is_err());
}

#[test]
fn start_symbol_is_the_first_lhs() {
    let grammar = Grammar::parse_source("Program -> Stmt\nStmt -> a\n").unwrap();
    assert_eq!(grammar.start_symbol(), &Symbol::new("Program"));
}

#[test]
fn epsilon_production_has_an_empty_rhs() {
    let grammar = Grammar::parse_source("S -> epsilon\n").unwrap();
    assert!(grammar.production(0).rhs.is_empty());
}

#[test]
fn terminals_are_everything_not_on_a_lhs() {
    let grammar = Grammar::parse_source(
        "S -> S + T\n\
         S -> T\n\
         T -> T * F\n\
         T -> F\n\
         F -> ( S )\n\
         F -> id\n",
    )
    .unwrap();
    for terminal in ["+", "*", "(", ")", "id"] {
        assert!(grammar.is_terminal(&Symbol::new(terminal)), "{terminal} should be a terminal");
    }
    for nonterminal in ["S", "T", "F"] {
        assert!(grammar.is_nonterminal(&Symbol::new(nonterminal)));
    }
}

#[test]
fn augment_prepends_a_fresh_start_production() {
    let grammar = Grammar::parse_source("S -> a\n").unwrap();
    let augmented = grammar.augment();
    assert_eq!(augmented.grammar.productions().len(), 2);
    assert_eq!(augmented.grammar.production(0).lhs, augmented.augmented_start);
    assert_eq!(augmented.grammar.production(0).rhs, vec![Symbol::new("S")]);
}
