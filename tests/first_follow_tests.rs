//! Integration tests for FIRST and FOLLOW set computation.

use lr1_parser::grammar::Grammar;
use lr1_parser::first_follow::{compute_first_sets, compute_follow_sets, first_of_string};
use lr1_parser::Symbol;

#[test]
fn first_of_nonterminal_includes_its_terminal_alternative() {
    let grammar = Grammar::parse_source("S -> A B\nA -> a\n").unwrap();
    let first = compute_first_sets(&grammar);
    assert!(first.get(&Symbol::new("A")).unwrap().contains(&Symbol::new("a")));
}

#[test]
fn follow_of_start_symbol_contains_end_marker() {
    let grammar = Grammar::parse_source("S -> A B\nA -> a\nB -> b\n").unwrap();
    let first = compute_first_sets(&grammar);
    let follow = compute_follow_sets(&grammar, &first);
    assert!(follow.get(&Symbol::new("S")).unwrap().contains(grammar.end_marker()));
}

#[test]
fn first_propagates_epsilon_from_a_nullable_alternative() {
    let grammar = Grammar::parse_source("S -> A B\nA -> a\nA -> \n").unwrap();
    let first = compute_first_sets(&grammar);
    let first_a = first.get(&Symbol::new("A")).unwrap();
    assert!(first_a.contains(&Symbol::new("a")));
    assert!(first_a.contains(grammar.epsilon()));
}

#[test]
fn first_of_string_follows_through_nullable_prefixes() {
    let grammar = Grammar::parse_source("S -> A B\nA -> a\n").unwrap();
    let first = compute_first_sets(&grammar);
    let symbols = vec![Symbol::new("A"), Symbol::new("B")];
    let result = first_of_string(&first, &symbols, grammar.epsilon());
    assert!(result.contains(&Symbol::new("a")));
}

#[test]
fn follow_propagates_first_of_the_next_symbol() {
    let grammar = Grammar::parse_source("S -> A B\nA -> a\nB -> b\n").unwrap();
    let first = compute_first_sets(&grammar);
    let follow = compute_follow_sets(&grammar, &first);
    assert!(follow.get(&Symbol::new("A")).unwrap().contains(&Symbol::new("b")));
}

#[test]
fn dangling_else_style_grammar_computes_consistent_sets() {
    // S -> A B, A -> a A | d, B -> b B c | epsilon: mirrors the classic
    // "dangling" construction used to exercise FIRST/FOLLOW propagation
    // across a self-recursive and a right-recursive nonterminal at once.
    let grammar = Grammar::parse_source(
        "S -> A B\n\
         A -> a A\n\
         A -> d\n\
         B -> b B c\n\
         B -> \n",
    )
    .unwrap();
    let first = compute_first_sets(&grammar);
    let follow = compute_follow_sets(&grammar, &first);

    let first_s = first.get(&Symbol::new("S")).unwrap();
    assert!(first_s.contains(&Symbol::new("a")));
    assert!(first_s.contains(&Symbol::new("d")));

    let follow_a = follow.get(&Symbol::new("A")).unwrap();
    assert!(follow_a.contains(&Symbol::new("b")));
    assert!(follow_a.contains(grammar.end_marker()));
}
