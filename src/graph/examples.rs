//! Fixture grammars shared by tests and the demo program.
//!
//! Both fixtures wire the graph by hand through the raw construction API so
//! that the exact link shapes (including the repetition self-links) are
//! visible in one place.

use crate::graph::{GrammarGraph, Terminal};

/// The worked three-nonterminal grammar:
///
/// ```text
/// A ::= 'x' | '(' B ')'
/// B ::= A C
/// C ::= { '+' A }
/// ```
pub fn make_sum() -> GrammarGraph<Terminal> {
  let mut g = GrammarGraph::new();
  let a = g.header("A");
  let b = g.header("B");
  let c = g.header("C");

  // A ::= 'x' | '(' B ')'
  let x = g.terminal("x");
  let lparen = g.terminal("(");
  let rparen = g.terminal(")");
  g.set_entry(a, x);
  g.set_alt(x, lparen);
  let b_ref = g.nonterminal(b);
  g.set_next(lparen, b_ref);
  g.set_next(b_ref, rparen);

  // B ::= A C
  let a_ref = g.nonterminal(a);
  let c_ref = g.nonterminal(c);
  g.set_next(a_ref, c_ref);
  g.set_entry(b, a_ref);

  // C ::= { '+' A }: ε as the alternative, and the tail loops back to '+'.
  let plus = g.terminal("+");
  let empty = g.terminal(Terminal::empty());
  g.set_entry(c, plus);
  g.set_alt(plus, empty);
  let loop_ref = g.nonterminal(a);
  g.set_next(plus, loop_ref);
  g.set_next(loop_ref, plus);

  g
}

/// The same language folded into a single nonterminal:
///
/// ```text
/// A ::= 'x' | '(' A { '+' A } ')'
/// ```
pub fn make_sum_reduced() -> GrammarGraph<Terminal> {
  let mut g = GrammarGraph::new();
  let a = g.header("A");

  let x = g.terminal("x");
  let lparen = g.terminal("(");
  let rparen = g.terminal(")");
  let plus = g.terminal("+");
  let empty = g.terminal(Terminal::empty());

  g.set_entry(a, lparen);
  g.set_alt(lparen, x);

  let inner_ref = g.nonterminal(a);
  g.set_next(lparen, inner_ref);
  g.set_next(inner_ref, plus);

  // { '+' A }
  g.set_alt(plus, empty);
  let loop_ref = g.nonterminal(a);
  g.set_next(plus, loop_ref);
  g.set_next(loop_ref, plus);

  // Leaving the loop through ε continues to the closing paren.
  g.set_next(empty, rparen);

  g
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_fixtures_validate() {
    assert!(make_sum().validate().is_ok());
    assert!(make_sum_reduced().validate().is_ok());
  }

  #[test]
  fn test_sum_shapes() {
    let g = make_sum();
    let c = g.try_get_header("C").unwrap();
    let plus = g.get_header(c).entry().unwrap();
    assert_eq!(plus.as_term().unwrap().str(), "+");
    assert!(plus.alt().unwrap().as_term().unwrap().is_empty());
    // '+' A loops back to '+'.
    let loop_ref = plus.next().unwrap();
    assert_eq!(loop_ref.as_nonterm().unwrap().symbol().str(), "A");
    assert_eq!(loop_ref.next().unwrap().id(), plus.id());
  }
}
