//! lexforge: compiles prioritized lexer patterns into a byte-level state
//! graph ready for code generation.
//!
//! # Example
//!
//! ```
//! use lexforge_compiler::{LeafSpec, LexerBuilder};
//!
//! let compiled = LexerBuilder::new()
//!     .leaf(LeafSpec::token("fast").with_priority(10))
//!     .leaf(LeafSpec::regex("[a-z]+"))
//!     .build()
//!     .expect("valid patterns");
//!
//! let graph = compiled.graph();
//! assert_eq!(graph.longest_match(b"fast"), Some((4, 0)));
//! assert_eq!(graph.longest_match(b"faster"), Some((6, 1)));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;
pub mod graph;
pub mod leaf;

mod builder;

#[cfg(test)]
pub mod test_utils;

pub use builder::{Compiled, Config, LexerBuilder};
pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity};
pub use graph::{Graph, GraphError, State};
pub use leaf::{Leaf, LeafId, LeafKind, LeafSpec, PatternSource};

use lexforge_automata::{DfaConversionError, NfaConstructionError};

/// Errors that can occur while compiling a lexer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Some patterns failed to translate, or leaves tie on priority.
    #[error("lexer compilation failed with {} errors", .0.error_count())]
    InvalidPatterns(Diagnostics),

    #[error(transparent)]
    Nfa(#[from] NfaConstructionError),

    #[error(transparent)]
    Dfa(#[from] DfaConversionError),
}

pub type Result<T> = std::result::Result<T, Error>;
