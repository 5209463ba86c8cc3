//! A graph representation of context-free grammars, with FIRST-set
//! computation.
//!
//! A grammar is a set of [`graph::Header`]s (named nonterminals), each owning
//! an entry point into a graph of two-link nodes. A node is either a literal
//! terminal or a reference to a header, and carries an optional `next`
//! (sequencing) link and an optional `alt` (alternative) link. That one node
//! shape encodes sequence, choice, and repetition; repetition is a `next`
//! link pointing back at the loop entry, so the graph is cyclic by design.
//!
//! [`graph::header_firsts`] and [`graph::node_firsts`] walk such a graph and
//! return the set of terminals that can begin a derivation, breaking cycles
//! with a per-call visited set.

pub mod graph;
pub mod utils;
