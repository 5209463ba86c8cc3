//! FIRST-set computation over a grammar graph.
//!
//! The walk is keyed by node identity: a per-call visited set breaks the
//! cycles the repetition encoding and mutual nonterminal recursion create,
//! which is what guarantees termination. The graph is never mutated, so
//! independent calls may run concurrently, each with its own visited set.
//!
//! A reference node contributes exactly the firsts of the header it expands
//! to; it does not fall through to its `next` link when the referenced
//! nonterminal can derive the empty symbol. A textbook-complete FIRST
//! computation would need that fall-through plus a nullability predicate per
//! header; this walk deliberately keeps the simpler rule.

use std::collections::BTreeSet;

use crate::graph::{GrammarGraph, Header, HeaderId, Node, NodeId, NodeKind};
use crate::utils::OrdKey;

struct FirstWalk<'a, T> {
  graph: &'a GrammarGraph<T>,
  visited: BTreeSet<NodeId>,
  found: BTreeSet<T>,
}

impl<'a, T> FirstWalk<'a, T>
where
  T: OrdKey,
{
  fn new(graph: &'a GrammarGraph<T>) -> Self {
    FirstWalk {
      graph,
      visited: BTreeSet::new(),
      found: BTreeSet::new(),
    }
  }

  fn walk_header(&mut self, header: Header<'a, T>) {
    // A header contributes exactly what its entry contributes; an absent
    // entry contributes nothing.
    self.walk_node(header.entry());
  }

  fn walk_node(&mut self, node: Option<Node<'a, T>>) {
    let node = match node {
      Some(n) => n,
      None => return,
    };
    if !self.visited.insert(node.id()) {
      log::trace!("first walk: cycle broken at {}", node.id());
      return;
    }

    match node.kind() {
      NodeKind::Term(t) => {
        log::trace!("first walk: {} contributes {:?}", node.id(), t);
        self.found.insert(t.clone());
      }
      NodeKind::NonTerm(h) => {
        // The firsts of a reference node come entirely from its expansion;
        // `next` is not consulted.
        self.walk_header(self.graph.get_header(*h));
      }
    }

    // The alternative branch always contributes its own firsts.
    self.walk_node(node.alt());
  }

  fn into_firsts(self) -> BTreeSet<T> {
    self.found
  }
}

/// Returns the set of terminal symbols that can begin a derivation starting
/// at `start`. `None` yields the empty set.
pub fn node_firsts<T>(
  graph: &GrammarGraph<T>,
  start: Option<NodeId>,
) -> BTreeSet<T>
where
  T: OrdKey,
{
  let mut walk = FirstWalk::new(graph);
  walk.walk_node(start.map(|id| graph.node(id)));
  walk.into_firsts()
}

/// Returns the FIRST set of the nonterminal named by `header`. A header
/// without an entry yields the empty set.
pub fn header_firsts<T>(
  graph: &GrammarGraph<T>,
  header: HeaderId,
) -> BTreeSet<T>
where
  T: OrdKey,
{
  let mut walk = FirstWalk::new(graph);
  walk.walk_header(graph.get_header(header));
  walk.into_firsts()
}

impl<T> GrammarGraph<T>
where
  T: OrdKey,
{
  /// See [`header_firsts`].
  pub fn firsts(&self, header: HeaderId) -> BTreeSet<T> {
    header_firsts(self, header)
  }
}

impl<'a, T> Node<'a, T>
where
  T: OrdKey,
{
  pub fn firsts(&self) -> BTreeSet<T> {
    node_firsts(self.graph(), Some(self.id()))
  }
}

impl<'a, T> Header<'a, T>
where
  T: OrdKey,
{
  pub fn firsts(&self) -> BTreeSet<T> {
    header_firsts(self.graph(), self.id())
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::graph::examples::{make_sum, make_sum_reduced};
  use crate::graph::Terminal;

  fn set(syms: &[&str]) -> BTreeSet<Terminal> {
    syms.iter().map(|s| Terminal::new(s)).collect()
  }

  #[test]
  fn test_absent_node_yields_empty_set() {
    let g: GrammarGraph<Terminal> = GrammarGraph::new();
    assert!(node_firsts(&g, None).is_empty());
  }

  #[test]
  fn test_undefined_header_yields_empty_set() {
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let a = g.header("A");
    assert!(header_firsts(&g, a).is_empty());
  }

  #[test]
  fn test_single_terminal() {
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let x = g.terminal("x");
    assert_eq!(node_firsts(&g, Some(x)), set(&["x"]));
  }

  #[test]
  fn test_choice_unions_both_branches() {
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let x = g.terminal("x");
    let lparen = g.terminal("(");
    g.set_alt(x, lparen);
    assert_eq!(node_firsts(&g, Some(x)), set(&["x", "("]));
  }

  #[test]
  fn test_choice_union_law() {
    // first(n with alt m) == first(n without alt) ∪ first(m).
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let x = g.terminal("x");
    let y = g.terminal("y");
    let without_alt = node_firsts(&g, Some(x));
    let alt_only = node_firsts(&g, Some(y));
    g.set_alt(x, y);
    let with_alt = node_firsts(&g, Some(x));
    assert_eq!(
      with_alt,
      without_alt.union(&alt_only).cloned().collect::<BTreeSet<_>>()
    );
  }

  #[test]
  fn test_sequence_does_not_leak_into_firsts() {
    // D ::= 'x'; a reference to D followed by ')' must not pick up ')'.
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let d = g.header("D");
    let x = g.terminal("x");
    g.set_entry(d, x);
    let d_ref = g.nonterminal(d);
    let rparen = g.terminal(")");
    g.set_next(d_ref, rparen);
    assert_eq!(node_firsts(&g, Some(d_ref)), header_firsts(&g, d));
    assert_eq!(node_firsts(&g, Some(d_ref)), set(&["x"]));
  }

  #[test]
  fn test_repetition_terminates() {
    // C ::= { '+' A }, the loop from the worked grammar.
    let g = make_sum();
    let c = g.try_get_header("C").unwrap();
    assert_eq!(header_firsts(&g, c), set(&["+", "ε"]));
  }

  #[test]
  fn test_worked_grammar() {
    let g = make_sum();
    let a = g.try_get_header("A").unwrap();
    let b = g.try_get_header("B").unwrap();
    assert_eq!(header_firsts(&g, a), set(&["x", "("]));
    assert_eq!(header_firsts(&g, b), set(&["x", "("]));
  }

  #[test]
  fn test_worked_grammar_reduced() {
    // A ::= 'x' | '(' A { '+' A } ')'
    let g = make_sum_reduced();
    let a = g.try_get_header("A").unwrap();
    assert_eq!(header_firsts(&g, a), set(&["x", "("]));
  }

  #[test]
  fn test_deterministic_across_calls() {
    let g = make_sum_reduced();
    let a = g.try_get_header("A").unwrap();
    assert_eq!(header_firsts(&g, a), header_firsts(&g, a));
  }

  #[test]
  fn test_self_referencing_header_terminates() {
    // A ::= A, a degenerate self-reference.
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let a = g.header("A");
    let a_ref = g.nonterminal(a);
    g.set_entry(a, a_ref);
    assert!(header_firsts(&g, a).is_empty());
  }

  #[test]
  fn test_mutual_recursion_terminates() {
    // A ::= B | 'a'; B ::= A | 'b'
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let a = g.header("A");
    let b = g.header("B");
    let b_ref = g.nonterminal(b);
    let a_t = g.terminal("a");
    g.set_alt(b_ref, a_t);
    g.set_entry(a, b_ref);
    let a_ref = g.nonterminal(a);
    let b_t = g.terminal("b");
    g.set_alt(a_ref, b_t);
    g.set_entry(b, a_ref);

    assert_eq!(header_firsts(&g, a), set(&["a", "b"]));
    assert_eq!(header_firsts(&g, b), set(&["a", "b"]));
  }

  #[test]
  fn test_shared_header_does_not_cross_contaminate() {
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let a = g.header("A");
    let x = g.terminal("x");
    g.set_entry(a, x);
    let ref1 = g.nonterminal(a);
    let ref2 = g.nonterminal(a);
    let z = g.header("Z");
    let z_t = g.terminal("z");
    g.set_entry(z, z_t);

    assert_eq!(node_firsts(&g, Some(ref1)), node_firsts(&g, Some(ref2)));
    assert_eq!(node_firsts(&g, Some(ref1)), set(&["x"]));
    // The unrelated header is untouched by earlier walks.
    assert_eq!(header_firsts(&g, z), set(&["z"]));
  }

  #[test]
  fn test_view_accessors_match_free_functions() {
    let g = make_sum();
    let a = g.try_get_header("A").unwrap();
    let header = g.get_header(a);
    assert_eq!(header.firsts(), header_firsts(&g, a));
    let entry = header.entry().unwrap();
    assert_eq!(entry.firsts(), node_firsts(&g, Some(entry.id())));
  }
}
