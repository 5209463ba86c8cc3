//! Creation and querying of grammar graphs.

mod base;
pub mod builder;
pub mod dot;
pub mod examples;
pub mod firsts;

pub use base::{
  GrammarGraph, GraphErrors, Header, HeaderId, Node, NodeId, NodeKind,
  Terminal, EMPTY_SYMBOL,
};
pub use builder::{build, BuilderInto, GraphBuilder};
pub use firsts::{header_firsts, node_firsts};
