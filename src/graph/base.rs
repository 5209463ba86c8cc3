use {
  crate::graph::builder::BuilderInto,
  crate::utils::{breadth_first_search, Name, ToDoc},
  std::collections::{BTreeMap, BTreeSet},
};

use derivative::Derivative;
use std::fmt::Debug;

/// The distinguished terminal symbol standing for the empty string.
///
/// FIRST computation treats it like any other terminal; it is not stripped
/// from result sets.
pub const EMPTY_SYMBOL: &str = "ε";

/// Identifies a node within its owning `GrammarGraph`.
///
/// Ids are plain indices. They stay valid for the lifetime of the graph,
/// which is what lets `next`/`alt` links form cycles that owning references
/// could not express.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub(crate) usize);

/// Identifies a header (a named nonterminal) within its owning `GrammarGraph`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct HeaderId(pub(crate) usize);

impl std::fmt::Display for NodeId {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(fmt, "n{}", self.0)
  }
}

impl std::fmt::Display for HeaderId {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(fmt, "h{}", self.0)
  }
}

/// What a node stands for: a literal terminal, or a reference to a header.
///
/// A single node kind plus the two optional links (`next`, `alt`) is enough
/// to express sequence, choice, and repetition; there are no separate
/// structure node kinds.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq)]
pub enum NodeKind<T> {
  Term(T),
  NonTerm(HeaderId),
}

impl<T> NodeKind<T> {
  /// If this kind is a terminal, returns a `Some` value containing the
  /// terminal symbol. Returns `None` otherwise.
  pub fn as_term(&self) -> Option<&T> {
    match self {
      NodeKind::NonTerm(_) => None,
      NodeKind::Term(t) => Some(t),
    }
  }

  /// Gets the referenced header id if this kind is a nonterminal reference.
  pub fn as_nonterm(&self) -> Option<HeaderId> {
    match self {
      NodeKind::NonTerm(h) => Some(*h),
      NodeKind::Term(_) => None,
    }
  }
}

impl<T> Debug for NodeKind<T>
where
  T: Debug,
{
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      NodeKind::Term(t) => write!(fmt, "{:?}", t),
      NodeKind::NonTerm(h) => write!(fmt, "<{}>", h),
    }
  }
}

#[derive(Clone, Debug)]
struct NodeInner<T> {
  kind: NodeKind<T>,
  next: Option<NodeId>,
  alt: Option<NodeId>,
}

#[derive(Clone, Debug)]
struct HeaderInner {
  symbol: Name,
  entry: Option<NodeId>,
}

/// An arena-backed grammar graph.
///
/// Headers name nonterminals and own an entry point into a node graph; nodes
/// carry a terminal symbol or a header reference, plus a `next` (sequencing)
/// and `alt` (alternative) link. The encoding conventions:
///
/// - sequence: nodes chained through `next`, last `next` absent;
/// - choice: nodes chained through `alt`, last `alt` absent;
/// - repetition ("zero or more"): an `ε` terminal reachable through `alt`,
///   and a `next` link pointing back at the loop entry.
///
/// The repetition encoding makes the graph cyclic on purpose. Construction
/// performs no validation (see [`GrammarGraph::validate`] for the optional
/// check); once built, the graph is read-only as far as queries go.
#[derive(Clone)]
pub struct GrammarGraph<T> {
  nodes: Vec<NodeInner<T>>,
  headers: Vec<HeaderInner>,
  by_symbol: BTreeMap<Name, HeaderId>,
}

impl<T> Default for GrammarGraph<T> {
  fn default() -> Self {
    GrammarGraph::new()
  }
}

impl<T> GrammarGraph<T> {
  pub fn new() -> Self {
    GrammarGraph {
      nodes: Vec::new(),
      headers: Vec::new(),
      by_symbol: BTreeMap::new(),
    }
  }

  /// Adds a terminal node carrying the given symbol.
  pub fn terminal(&mut self, sym: impl BuilderInto<T>) -> NodeId {
    self.add_node(NodeKind::Term(sym.builder_into()))
  }

  /// Adds a node referencing the given header.
  ///
  /// The reference is by id only; the node does not own the header or its
  /// entry graph, and many nodes may reference the same header.
  pub fn nonterminal(&mut self, header: HeaderId) -> NodeId {
    self.add_node(NodeKind::NonTerm(header))
  }

  fn add_node(&mut self, kind: NodeKind<T>) -> NodeId {
    let id = NodeId(self.nodes.len());
    self.nodes.push(NodeInner {
      kind,
      next: None,
      alt: None,
    });
    id
  }

  /// Looks up the header for `symbol`, creating it (with no entry yet) if it
  /// does not exist. One header per distinct symbol name; the returned id is
  /// stable for the graph's lifetime.
  pub fn header(&mut self, symbol: impl BuilderInto<Name>) -> HeaderId {
    let symbol = symbol.builder_into();
    if let Some(id) = self.by_symbol.get(&symbol) {
      return *id;
    }
    let id = HeaderId(self.headers.len());
    self.headers.push(HeaderInner {
      symbol: symbol.clone(),
      entry: None,
    });
    self.by_symbol.insert(symbol, id);
    id
  }

  /// Looks up a header by symbol name without creating it.
  pub fn try_get_header(
    &self,
    symbol: &(impl AsRef<str> + ?Sized),
  ) -> Option<HeaderId> {
    self.by_symbol.get(&Name::new(symbol)).copied()
  }

  /// Sets the entry point of a header. A plain assignment; any previous
  /// entry is replaced.
  pub fn set_entry(&mut self, header: HeaderId, entry: NodeId) {
    self.headers[header.0].entry = Some(entry);
  }

  /// Links `from` to `to` through the sequencing (`next`) link.
  pub fn set_next(&mut self, from: NodeId, to: NodeId) {
    self.nodes[from.0].next = Some(to);
  }

  /// Links `from` to `to` through the alternative (`alt`) link.
  pub fn set_alt(&mut self, from: NodeId, to: NodeId) {
    self.nodes[from.0].alt = Some(to);
  }

  /// Returns a borrowed view of the node with the given id.
  pub fn node(&self, id: NodeId) -> Node<T> {
    Node { graph: self, id }
  }

  /// Returns a borrowed view of the header with the given id.
  pub fn get_header(&self, id: HeaderId) -> Header<T> {
    Header { graph: self, id }
  }

  /// Iterates over all headers in creation order.
  pub fn headers(&self) -> impl Iterator<Item = Header<T>> {
    (0..self.headers.len()).map(move |i| self.get_header(HeaderId(i)))
  }

  /// Iterates over all nodes in creation order.
  pub fn nodes(&self) -> impl Iterator<Item = Node<T>> {
    (0..self.nodes.len()).map(move |i| self.node(NodeId(i)))
  }

  pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
    (0..self.nodes.len()).map(NodeId)
  }

  pub fn header_ids(&self) -> impl Iterator<Item = HeaderId> {
    (0..self.headers.len()).map(HeaderId)
  }

  fn reachable_nodes(&self) -> BTreeSet<NodeId> {
    breadth_first_search(
      self.headers.iter().filter_map(|h| h.entry),
      |id| {
        let inner = &self.nodes[id.0];
        inner
          .next
          .iter()
          .chain(inner.alt.iter())
          .copied()
          .collect::<Vec<_>>()
      },
    )
  }

  /// Checks the graph for structural problems: headers that were declared
  /// (or referenced) but never given an entry, and nodes unreachable from
  /// every entry point.
  ///
  /// This is advisory. A graph that fails validation is still safe to query;
  /// an undefined header simply contributes an empty FIRST set.
  pub fn validate(&self) -> Result<(), GraphErrors> {
    let reachable = self.reachable_nodes();
    let errors = GraphErrors {
      undefined_nonterminals: self
        .headers
        .iter()
        .filter(|h| h.entry.is_none())
        .map(|h| h.symbol.clone())
        .collect(),
      orphan_nodes: self
        .node_ids()
        .filter(|id| !reachable.contains(id))
        .collect(),
    };
    log::debug!(
      "validated graph: {} headers, {} nodes, {} reachable",
      self.headers.len(),
      self.nodes.len(),
      reachable.len()
    );
    errors.into_result()
  }
}

impl<T> Debug for GrammarGraph<T>
where
  T: Debug,
{
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = f.debug_struct("GrammarGraph");
    dbg_struct.field("headers", &self.headers().collect::<Vec<_>>());
    dbg_struct.field("nodes", &self.nodes().collect::<Vec<_>>());
    dbg_struct.finish()
  }
}

impl<T> GrammarGraph<T>
where
  T: ToDoc,
{
  pub fn to_pretty(&self) -> String {
    let arena = pretty::Arena::new();
    format!("{}", self.to_doc(&arena).into_doc().pretty(80))
  }
}

impl<T> ToDoc for GrammarGraph<T>
where
  T: ToDoc,
{
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    // Cycle-safe by construction: links are printed as ids, never chased.
    let header_entries = self.headers().map(|h| {
      let entry = match h.entry() {
        Some(n) => da.text(n.id().to_string()),
        None => da.text("?"),
      };
      h.symbol()
        .to_doc(da)
        .append(da.text(" ->"))
        .append(da.softline())
        .append(entry)
        .append(da.text(";"))
        .append(da.softline())
    });

    let node_entries = self.nodes().map(|n| {
      let mut doc = da.text(n.id().to_string()).append(da.text(": "));
      doc = match n.kind() {
        NodeKind::Term(t) => doc.append(t.to_doc(da)),
        NodeKind::NonTerm(h) => doc
          .append(da.text("<"))
          .append(self.get_header(*h).symbol().to_doc(da))
          .append(da.text(">")),
      };
      if let Some(next) = n.next() {
        doc = doc
          .append(da.softline())
          .append(da.text(format!("next={}", next.id())));
      }
      if let Some(alt) = n.alt() {
        doc = doc
          .append(da.softline())
          .append(da.text(format!("alt={}", alt.id())));
      }
      doc.append(da.text(";")).append(da.softline())
    });

    da.concat(header_entries)
      .append(da.softline().append(da.concat(node_entries).nest(2)).braces())
  }
}

/// Problems found by [`GrammarGraph::validate`]. Collected wholesale rather
/// than reported one at a time.
#[derive(Clone, Debug, thiserror::Error)]
#[error(
  "invalid grammar graph: undefined nonterminals {undefined_nonterminals:?}, \
   orphan nodes {orphan_nodes:?}"
)]
pub struct GraphErrors {
  pub undefined_nonterminals: BTreeSet<Name>,
  pub orphan_nodes: BTreeSet<NodeId>,
}

impl GraphErrors {
  fn into_result(self) -> Result<(), Self> {
    if self.undefined_nonterminals.is_empty() && self.orphan_nodes.is_empty()
    {
      Ok(())
    } else {
      Err(self)
    }
  }
}

// ------------

/// A borrowed view of one node.
///
/// Views from different graphs must not be mixed; comparing them panics.
#[derive(Derivative)]
#[derivative(Copy(bound = ""), Clone(bound = ""))]
pub struct Node<'a, T> {
  graph: &'a GrammarGraph<T>,
  id: NodeId,
}

impl<'a, T> Node<'a, T> {
  pub(crate) fn graph(&self) -> &'a GrammarGraph<T> {
    self.graph
  }

  pub fn id(&self) -> NodeId {
    self.id
  }

  pub fn kind(&self) -> &'a NodeKind<T> {
    &self.graph.nodes[self.id.0].kind
  }

  /// Returns the terminal symbol if this is a terminal node.
  pub fn as_term(&self) -> Option<&'a T> {
    self.kind().as_term()
  }

  /// Returns a view of the referenced header if this is a reference node.
  pub fn as_nonterm(&self) -> Option<Header<'a, T>> {
    self.kind().as_nonterm().map(|h| self.graph.get_header(h))
  }

  pub fn next(&self) -> Option<Node<'a, T>> {
    self.graph.nodes[self.id.0].next.map(|id| self.graph.node(id))
  }

  pub fn alt(&self) -> Option<Node<'a, T>> {
    self.graph.nodes[self.id.0].alt.map(|id| self.graph.node(id))
  }
}

fn assert_same_graph<T>(a: &GrammarGraph<T>, b: &GrammarGraph<T>) {
  assert!(
    std::ptr::eq(a, b),
    "compared views from two different grammar graphs"
  );
}

impl<'a, T> PartialEq for Node<'a, T> {
  fn eq(&self, other: &Self) -> bool {
    assert_same_graph(self.graph, other.graph);
    self.id == other.id
  }
}

impl<'a, T> Eq for Node<'a, T> {}

impl<'a, T> PartialOrd for Node<'a, T> {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

impl<'a, T> Ord for Node<'a, T> {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering {
    assert_same_graph(self.graph, other.graph);
    self.id.cmp(&other.id)
  }
}

impl<'a, T> Debug for Node<'a, T>
where
  T: Debug,
{
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = fmt.debug_struct("Node");
    dbg_struct.field("id", &self.id);
    dbg_struct.field("kind", self.kind());
    dbg_struct.field("next", &self.graph.nodes[self.id.0].next);
    dbg_struct.field("alt", &self.graph.nodes[self.id.0].alt);
    dbg_struct.finish()
  }
}

// ------------

/// A borrowed view of one header.
#[derive(Derivative)]
#[derivative(Copy(bound = ""), Clone(bound = ""))]
pub struct Header<'a, T> {
  graph: &'a GrammarGraph<T>,
  id: HeaderId,
}

impl<'a, T> Header<'a, T> {
  pub(crate) fn graph(&self) -> &'a GrammarGraph<T> {
    self.graph
  }

  pub fn id(&self) -> HeaderId {
    self.id
  }

  pub fn symbol(&self) -> &'a Name {
    &self.graph.headers[self.id.0].symbol
  }

  /// The root of the node graph defining this nonterminal's productions.
  /// `None` means "declared, not yet defined".
  pub fn entry(&self) -> Option<Node<'a, T>> {
    self.graph.headers[self.id.0].entry.map(|id| self.graph.node(id))
  }
}

impl<'a, T> PartialEq for Header<'a, T> {
  fn eq(&self, other: &Self) -> bool {
    assert_same_graph(self.graph, other.graph);
    self.id == other.id
  }
}

impl<'a, T> Eq for Header<'a, T> {}

impl<'a, T> Debug for Header<'a, T>
where
  T: Debug,
{
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = fmt.debug_struct("Header");
    dbg_struct.field("symbol", self.symbol());
    dbg_struct.field("entry", &self.graph.headers[self.id.0].entry);
    dbg_struct.finish()
  }
}

// ------------

/// A simple terminal symbol type, for callers that do not bring their own.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Terminal(Name);

impl Terminal {
  pub fn new(s: &str) -> Self {
    Terminal(Name::new(s))
  }

  /// The distinguished empty symbol [`EMPTY_SYMBOL`].
  pub fn empty() -> Self {
    Terminal::new(EMPTY_SYMBOL)
  }

  pub fn is_empty(&self) -> bool {
    self.0.str() == EMPTY_SYMBOL
  }

  pub fn str(&self) -> &str {
    self.0.str()
  }
}

impl std::fmt::Display for Terminal {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    fmt.write_str(self.0.str())
  }
}

impl ToDoc for Terminal {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    da.text(format!("'{}'", self.0.str()))
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_terminal_node_roundtrip() {
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let x = g.terminal("x");
    let node = g.node(x);
    assert_eq!(node.as_term(), Some(&Terminal::new("x")));
    assert!(node.as_nonterm().is_none());
    assert!(node.next().is_none());
    assert!(node.alt().is_none());
  }

  #[test]
  fn test_header_identity_is_per_symbol() {
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let a1 = g.header("A");
    let b = g.header("B");
    let a2 = g.header("A");
    assert_eq!(a1, a2);
    assert_ne!(a1, b);
    assert_eq!(g.try_get_header("A"), Some(a1));
    assert_eq!(g.try_get_header("C"), None);
  }

  #[test]
  fn test_reference_node_points_at_header() {
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let a = g.header("A");
    let r = g.nonterminal(a);
    let view = g.node(r);
    assert!(view.as_term().is_none());
    assert_eq!(view.as_nonterm().map(|h| h.id()), Some(a));
    assert_eq!(view.as_nonterm().unwrap().symbol().str(), "A");
  }

  #[test]
  fn test_links_are_plain_assignments() {
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let x = g.terminal("x");
    let y = g.terminal("y");
    g.set_next(x, y);
    g.set_alt(x, y);
    // A self link is legal; this is how repetition is encoded.
    g.set_next(y, y);
    assert_eq!(g.node(x).next().map(|n| n.id()), Some(y));
    assert_eq!(g.node(x).alt().map(|n| n.id()), Some(y));
    assert_eq!(g.node(y).next().map(|n| n.id()), Some(y));
  }

  #[test]
  fn test_validate_reports_undefined_header() {
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let a = g.header("A");
    let r = g.nonterminal(a);
    let x = g.terminal("x");
    g.set_next(r, x);
    // "A" was never defined, and nothing reaches r or x.
    let errors = g.validate().unwrap_err();
    assert!(errors.undefined_nonterminals.contains(&Name::new("A")));
    assert!(errors.orphan_nodes.contains(&r));
    assert!(errors.orphan_nodes.contains(&x));
  }

  #[test]
  fn test_validate_accepts_cyclic_graph() {
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let a = g.header("A");
    let plus = g.terminal("+");
    let empty = g.terminal(Terminal::empty());
    g.set_alt(plus, empty);
    g.set_next(plus, plus);
    g.set_entry(a, plus);
    assert!(g.validate().is_ok());
  }

  #[test]
  fn test_pretty_rendering_terminates_on_cyclic_graph() {
    // The reduced sum grammar loops '+' back on itself through next.
    let rendered = crate::graph::examples::make_sum_reduced().to_pretty();
    assert!(rendered.contains("A ->"));
    assert!(rendered.contains("'+'"));
    assert!(rendered.contains("<A>"));
    assert!(rendered.contains("next="));
    assert!(rendered.contains("alt="));
  }

  #[test]
  fn test_entry_absent_until_defined() {
    let mut g: GrammarGraph<Terminal> = GrammarGraph::new();
    let a = g.header("A");
    assert!(g.get_header(a).entry().is_none());
    let x = g.terminal("x");
    g.set_entry(a, x);
    assert_eq!(g.get_header(a).entry().map(|n| n.id()), Some(x));
  }
}
