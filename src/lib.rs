#![forbid(missing_docs)]
//! # `lexdfa`
//! The `lexdfa` crate is the core of a lexer generator. It compiles regular expressions, grouped
//! into named contexts, into one minimal deterministic finite automaton (DFA) per context.
//! The DFAs are built directly from the expression tree with the followpos construction, without
//! an intermediate NFA, over the alphabet of the 256 byte values.
//! A code generator can walk the states and guarded transitions of each context, the crate
//! itself emits no source code.
//! To parse the given regular expressions, the crate uses the `regex-syntax` crate.
//!
//! # Example
//! ```rust
//! use lexdfa::LexerBuilder;
//!
//! let lexer = LexerBuilder::new()
//!     .add_patterns(&["abc", "[a-z]+"])
//!     .build()
//!     .expect("LexerBuilder error");
//! print!("{}", lexer.debug_string());
//! ```
//! The output of the example is:
//! ```text
//! s0:'a'->s1;['a'-'z']->s2;
//! s1:'b'->s3;['a'-'z']->s2;else->accept 2;
//! s2:['a'-'z']->s2;else->accept 2;
//! s3:'c'->s4;['a'-'z']->s2;else->accept 2;
//! s4:['a'-'z']->s2;else->accept 1;
//! ```
//! Each line is a state with its transitions, tried from left to right. `else` is taken if no
//! guard matches, `accept K` ends the match with lexeme `K`.
//!
//! # Crate features
//! The crate has the following features, both are enabled by default:
//! - `dot_writer`: Render the DFAs of the contexts in graphviz dot format.
//! - `serde`: Serialize and deserialize lexer modes, e.g. to load them from JSON files.

/// Module with the character set algebra
mod char_set;
pub use char_set::{CharClass, CharSet, Interval};

/// Module with the DFA state types
mod dfa_state;
pub use dfa_state::{DfaState, Guard, Transition};

/// Module with error definitions
mod errors;
pub use errors::{BuildError, LexDfaError, LexDfaErrorKind, Result};

/// Module with the expression tree
mod expression;
pub use expression::{ExprTree, Node, Position, PositionSet};

/// The module with internal implementation details.
mod internal;
pub use internal::ids::{ContextID, NodeID, PositionID, StateID};

/// The module with the lexer.
mod lexer;
pub use lexer::Lexer;

/// The module with the lexer builder.
mod lexer_builder;
pub use lexer_builder::{LexerBuilder, MAIN_CONTEXT};

/// The module with the lexer context.
mod lexer_context;
pub use lexer_context::LexerContext;

/// The module with the lexer mode.
mod lexer_mode;
pub use lexer_mode::{Expression, LexerMode, MatchAction};

/// Module that provides a Match type
mod match_type;
pub use match_type::Match;
