/// Module that provides functions and types related to DFAs.
pub(crate) mod dfa;
pub(crate) use dfa::Dfa;

/// Module with conversion to graphviz dot format
#[cfg(feature = "dot_writer")]
pub(crate) mod dot;

/// Module for several ID types.
pub(crate) mod ids;

/// Module that partitions the positions of a DFA state into transitions.
mod partition;

/// The parser module contains the pattern parser.
mod parser;
pub(crate) use parser::{expand, parse_expanded, parse_regex_syntax, Origin};

/// Module that adds parsed patterns to expression trees.
mod tree_builder;
pub(crate) use tree_builder::TreeBuilder;
