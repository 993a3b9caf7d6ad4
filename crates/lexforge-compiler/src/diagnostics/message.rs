use std::fmt;

use lexforge_automata::Span;

use crate::leaf::LeafId;

/// What went wrong, grouped by the stage that notices it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Pattern translation
    InvalidPattern,
    UnsupportedConstruct,
    UnknownClass,
    InvalidRepetition,

    // Leaf resolution
    AmbiguousPriority,

    // Observations on the finished graph
    MatchesEmpty,
    ShadowedLeaf,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::MatchesEmpty | Self::ShadowedLeaf => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Hint attached to every diagnostic of this kind.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedConstruct => {
                Some("lexer patterns must be recognizable by a finite automaton")
            }
            Self::AmbiguousPriority => Some("give one of the patterns an explicit higher priority"),
            Self::MatchesEmpty => Some("an empty match lets the lexer stall without consuming input"),
            _ => None,
        }
    }

    /// Base message, used when no detail is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::InvalidPattern => "invalid pattern",
            Self::UnsupportedConstruct => "unsupported regex construct",
            Self::UnknownClass => "unknown character class",
            Self::InvalidRepetition => "invalid repetition bounds",
            Self::AmbiguousPriority => "patterns match the same input with equal priority",
            Self::MatchesEmpty => "pattern matches the empty string",
            Self::ShadowedLeaf => "pattern never produces a token",
        }
    }

    /// Template for custom messages. `{}` is replaced by the detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnsupportedConstruct => "{} are not supported in lexer patterns".to_string(),
            Self::InvalidRepetition => "invalid repetition bounds {}".to_string(),
            Self::AmbiguousPriority => format!("{} {{}}", self.fallback_message()),
            Self::ShadowedLeaf => "pattern never produces a token: {}".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// - `None` gives `fallback_message()`
    /// - `Some(detail)` gives `custom_message()` filled with `detail`
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Secondary location, possibly in another leaf's pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) leaf: LeafId,
    pub(crate) range: Span,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(leaf: LeafId, range: Span, message: impl Into<String>) -> Self {
        Self {
            leaf,
            range,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// Leaf whose pattern the range points into.
    pub(crate) leaf: LeafId,
    pub(crate) range: Span,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn new(
        kind: DiagnosticKind,
        leaf: LeafId,
        range: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            leaf,
            range,
            message: message.into(),
            related: Vec::new(),
            hints: kind.default_hint().into_iter().map(String::from).collect(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, leaf: LeafId, range: Span) -> Self {
        Self::new(kind, leaf, range, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn leaf(&self) -> LeafId {
        self.leaf
    }

    pub fn range(&self) -> Span {
        self.range
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn related(&self) -> &[RelatedInfo] {
        &self.related
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in leaf {} at {}..{}: {}",
            self.severity(),
            self.leaf,
            self.range.start,
            self.range.end,
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} in leaf {} at {}..{})",
                related.message, related.leaf, related.range.start, related.range.end
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}
