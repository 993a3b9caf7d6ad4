//! Pattern compilation for lexforge: from regex source to a byte-level DFA.
//!
//! The pipeline runs leaves-first:
//! - `hir` - scalar-level pattern IR, character classes, regex-AST translation
//! - `utf8` - scalar ranges to UTF-8 byte-range sequences
//! - `nfa` - Thompson construction over bytes, epsilon-free after build
//! - `dfa` - byte classes and powerset construction
//!
//! Every stage consumes the previous one by reference and produces an owned
//! value. Nothing here performs I/O or prints; failures are typed errors.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod dfa;
pub mod hir;
pub mod nfa;
pub mod utf8;

mod error;

pub use error::{Construct, DfaConversionError, NfaConstructionError, RegexConversionError};

/// Byte range within a pattern's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl From<regex_syntax::ast::Span> for Span {
    fn from(span: regex_syntax::ast::Span) -> Self {
        Self::new(span.start.offset, span.end.offset)
    }
}

impl From<&regex_syntax::ast::Span> for Span {
    fn from(span: &regex_syntax::ast::Span) -> Self {
        Self::new(span.start.offset, span.end.offset)
    }
}
