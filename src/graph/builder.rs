use crate::graph::{GrammarGraph, GraphErrors, HeaderId, NodeId, Terminal};
use crate::utils::Name;

/// A helper trait to allow construction methods to either take a type `T`,
/// or a reference to `T` if it is clonable, or a `&str` for the common
/// name-like types.
pub trait BuilderInto<T> {
  /// Consumes self and produces a value of type `T`.
  fn builder_into(self) -> T;
}

impl<T> BuilderInto<T> for T {
  fn builder_into(self) -> T {
    self
  }
}

impl<'a, T> BuilderInto<T> for &'a T
where
  T: Clone,
{
  fn builder_into(self) -> T {
    self.clone()
  }
}

impl BuilderInto<Name> for &'_ str {
  fn builder_into(self) -> Name {
    Name::new(self)
  }
}

impl BuilderInto<Terminal> for &'_ str {
  fn builder_into(self) -> Terminal {
    Terminal::new(self)
  }
}

/// Wires nodes together according to the graph's encoding conventions.
///
/// The builder only adds convenience on top of the raw `GrammarGraph`
/// construction API; anything it can build can also be wired by hand with
/// `set_next`/`set_alt`/`set_entry`.
pub struct GraphBuilder<T> {
  graph: GrammarGraph<T>,
}

impl<T> GraphBuilder<T> {
  fn new() -> Self {
    GraphBuilder {
      graph: GrammarGraph::new(),
    }
  }

  fn finish(self) -> Result<GrammarGraph<T>, GraphErrors> {
    self.graph.validate()?;
    Ok(self.graph)
  }

  pub fn terminal(&mut self, sym: impl BuilderInto<T>) -> NodeId {
    self.graph.terminal(sym)
  }

  pub fn nonterminal(&mut self, header: HeaderId) -> NodeId {
    self.graph.nonterminal(header)
  }

  pub fn header(&mut self, symbol: impl BuilderInto<Name>) -> HeaderId {
    self.graph.header(symbol)
  }

  /// Sets a header's entry point.
  pub fn define(&mut self, header: HeaderId, entry: NodeId) -> &mut Self {
    self.graph.set_entry(header, entry);
    self
  }

  /// Chains the given nodes through `next` in order and returns the head.
  /// The last node's `next` is left absent.
  ///
  /// Panics if `nodes` is empty: an empty sequence has no head node to
  /// return.
  pub fn sequence(&mut self, nodes: &[NodeId]) -> NodeId {
    assert!(!nodes.is_empty());
    for pair in nodes.windows(2) {
      self.graph.set_next(pair[0], pair[1]);
    }
    nodes[0]
  }

  /// Chains the given nodes through `alt` in order and returns the head.
  /// The last node's `alt` is left absent.
  ///
  /// Panics if `nodes` is empty: an empty choice has no head node to
  /// return.
  pub fn choice(&mut self, nodes: &[NodeId]) -> NodeId {
    assert!(!nodes.is_empty());
    for pair in nodes.windows(2) {
      self.graph.set_alt(pair[0], pair[1]);
    }
    nodes[0]
  }

  /// Encodes "zero or more" of the construct starting at `entry` and ending
  /// at `tail` (pass `entry` again for a one-node body): an empty-symbol
  /// terminal becomes `entry`'s alternative, and `tail` loops back to
  /// `entry` through `next`.
  pub fn zero_or_more(
    &mut self,
    entry: NodeId,
    tail: NodeId,
    empty_sym: impl BuilderInto<T>,
  ) -> NodeId {
    let empty = self.graph.terminal(empty_sym);
    self.graph.set_alt(entry, empty);
    self.graph.set_next(tail, entry);
    entry
  }

  /// Raw access for wirings the combinators do not cover.
  pub fn graph_mut(&mut self) -> &mut GrammarGraph<T> {
    &mut self.graph
  }
}

/// Builds a validated grammar graph using a builder function.
///
/// Example:
///
/// ```rust
/// # use syngraph::graph::{build, GrammarGraph, Terminal};
/// // A ::= 'x' | '(' A ')'
/// let g: GrammarGraph<Terminal> = build(|b| {
///   let a = b.header("A");
///   let x = b.terminal("x");
///   let lparen = b.terminal("(");
///   let rparen = b.terminal(")");
///   let a_ref = b.nonterminal(a);
///   b.sequence(&[lparen, a_ref, rparen]);
///   let entry = b.choice(&[x, lparen]);
///   b.define(a, entry);
/// })
/// .unwrap();
/// assert!(g.try_get_header("A").is_some());
/// ```
pub fn build<T>(
  build_fn: impl FnOnce(&mut GraphBuilder<T>),
) -> Result<GrammarGraph<T>, GraphErrors> {
  let mut builder = GraphBuilder::new();
  build_fn(&mut builder);
  builder.finish()
}
