//! Error types for each pipeline stage.

use std::fmt;

use crate::Span;

/// Regex constructs that have no finite-automaton representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    Anchor,
    Backreference,
    Lookaround,
    Flags,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anchor => f.write_str("anchors and word boundaries"),
            Self::Backreference => f.write_str("backreferences"),
            Self::Lookaround => f.write_str("look-around assertions"),
            Self::Flags => f.write_str("inline flags"),
        }
    }
}

/// Failure translating a pattern into HIR.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegexConversionError {
    /// The regex parser rejected the pattern (includes possessive quantifiers).
    #[error("invalid pattern: {message}")]
    Parse { message: String, span: Span },

    #[error("{construct} are not supported in lexer patterns")]
    Unsupported { construct: Construct, span: Span },

    /// Unicode property, script or Perl class lookup failed.
    #[error("unknown character class: {message}")]
    UnknownProperty { message: String, span: Span },

    #[error("invalid repetition bounds {{{min},{}}}", .max.map(|m| m.to_string()).unwrap_or_default())]
    InvalidQuantifierBounds { min: u32, max: Option<u32> },
}

impl RegexConversionError {
    /// Location of the offending construct within the pattern, if known.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Parse { span, .. }
            | Self::Unsupported { span, .. }
            | Self::UnknownProperty { span, .. } => Some(*span),
            Self::InvalidQuantifierBounds { .. } => None,
        }
    }
}

/// Failure building the Thompson NFA.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NfaConstructionError {
    #[error("NFA exceeds the limit of {limit} states")]
    StateLimitExceeded { limit: usize },

    #[error("NFA exceeds the limit of {limit} patterns")]
    PatternLimitExceeded { limit: usize },

    /// Internal invariant violation while wiring states.
    #[error("invalid NFA operation: {0}")]
    InvalidOperation(&'static str),
}

/// Failure during powerset construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DfaConversionError {
    #[error("DFA exceeds the limit of {limit} states")]
    StateLimitExceeded { limit: usize },
}
