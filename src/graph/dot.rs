//! Graphviz export of grammar graphs.
//!
//! Headers and nodes both become dot nodes; edges are labelled with the link
//! they came from (`entry`, `next`, `alt`, or `ref` for a reference node
//! pointing at its header). Cycles are fine because edges are enumerated
//! from the arena, not chased.

use std::borrow::Cow;
use std::fmt::Display;

use crate::graph::{GrammarGraph, HeaderId, NodeId, NodeKind};

#[derive(Clone, Copy, PartialEq, Eq)]
enum DotNode {
  Header(HeaderId),
  Node(NodeId),
}

#[derive(Clone, Copy)]
enum EdgeKind {
  Entry,
  Next,
  Alt,
  Ref,
}

impl EdgeKind {
  fn label(&self) -> &'static str {
    match self {
      EdgeKind::Entry => "entry",
      EdgeKind::Next => "next",
      EdgeKind::Alt => "alt",
      EdgeKind::Ref => "ref",
    }
  }
}

#[derive(Clone, Copy)]
struct DotEdge {
  source: DotNode,
  target: DotNode,
  kind: EdgeKind,
}

struct DotGraph<'g, T> {
  graph: &'g GrammarGraph<T>,
}

impl<'a, 'g, T> dot::Labeller<'a, DotNode, DotEdge> for DotGraph<'g, T>
where
  T: Display,
{
  fn graph_id(&'a self) -> dot::Id<'a> {
    dot::Id::new("grammar").expect("static id is a valid dot identifier")
  }

  fn node_id(&'a self, n: &DotNode) -> dot::Id<'a> {
    let name = match n {
      DotNode::Header(h) => h.to_string(),
      DotNode::Node(id) => id.to_string(),
    };
    dot::Id::new(name).expect("arena ids are valid dot identifiers")
  }

  fn node_label(&'a self, n: &DotNode) -> dot::LabelText<'a> {
    let text = match n {
      DotNode::Header(h) => {
        self.graph.get_header(*h).symbol().str().to_string()
      }
      DotNode::Node(id) => match self.graph.node(*id).kind() {
        NodeKind::Term(t) => format!("'{}'", t),
        NodeKind::NonTerm(h) => {
          format!("<{}>", self.graph.get_header(*h).symbol())
        }
      },
    };
    dot::LabelText::label(text)
  }

  fn edge_label(&'a self, e: &DotEdge) -> dot::LabelText<'a> {
    dot::LabelText::label(e.kind.label())
  }
}

impl<'a, 'g, T> dot::GraphWalk<'a, DotNode, DotEdge> for DotGraph<'g, T> {
  fn nodes(&'a self) -> dot::Nodes<'a, DotNode> {
    let nodes = self
      .graph
      .header_ids()
      .map(DotNode::Header)
      .chain(self.graph.node_ids().map(DotNode::Node))
      .collect::<Vec<_>>();
    Cow::Owned(nodes)
  }

  fn edges(&'a self) -> dot::Edges<'a, DotEdge> {
    let mut edges = Vec::new();
    for header in self.graph.headers() {
      if let Some(entry) = header.entry() {
        edges.push(DotEdge {
          source: DotNode::Header(header.id()),
          target: DotNode::Node(entry.id()),
          kind: EdgeKind::Entry,
        });
      }
    }
    for node in self.graph.nodes() {
      if let Some(next) = node.next() {
        edges.push(DotEdge {
          source: DotNode::Node(node.id()),
          target: DotNode::Node(next.id()),
          kind: EdgeKind::Next,
        });
      }
      if let Some(alt) = node.alt() {
        edges.push(DotEdge {
          source: DotNode::Node(node.id()),
          target: DotNode::Node(alt.id()),
          kind: EdgeKind::Alt,
        });
      }
      if let Some(h) = node.kind().as_nonterm() {
        edges.push(DotEdge {
          source: DotNode::Node(node.id()),
          target: DotNode::Header(h),
          kind: EdgeKind::Ref,
        });
      }
    }
    Cow::Owned(edges)
  }

  fn source(&'a self, edge: &DotEdge) -> DotNode {
    edge.source
  }

  fn target(&'a self, edge: &DotEdge) -> DotNode {
    edge.target
  }
}

impl<T> GrammarGraph<T>
where
  T: Display,
{
  /// Renders this graph in Graphviz dot format.
  pub fn to_dot(&self) -> String {
    let mut writer = Vec::new();
    dot::render(&DotGraph { graph: self }, &mut writer)
      .expect("rendering to a Vec cannot fail");
    String::from_utf8(writer).expect("dot output is valid utf8")
  }
}
