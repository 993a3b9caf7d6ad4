//! Lexer leaves: one pattern with its priority and action.

use lexforge_automata::RegexConversionError;
use lexforge_automata::hir::HirKind;
use serde::Serialize;

/// Index of a leaf in input order. Equal to the NFA pattern id.
pub type LeafId = u32;

/// Pattern text as written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum PatternSource {
    /// Matched verbatim.
    Token(String),
    Regex(String),
}

impl PatternSource {
    pub fn text(&self) -> &str {
        match self {
            Self::Token(text) | Self::Regex(text) => text,
        }
    }
}

/// What the generated lexer does when the leaf matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    /// Produces a variant without data.
    #[default]
    CaseOnly,
    /// Produces a variant whose value comes from the callback.
    AssociatedValues,
    /// Consumes input without producing a token.
    Skip,
}

/// Leaf as declared by the front end, before translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSpec {
    pub source: PatternSource,
    /// `None` derives the priority from the pattern.
    pub priority: Option<u32>,
    pub kind: LeafKind,
    pub callback: Option<String>,
}

impl LeafSpec {
    pub fn token(text: impl Into<String>) -> Self {
        Self::new(PatternSource::Token(text.into()))
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::new(PatternSource::Regex(pattern.into()))
    }

    fn new(source: PatternSource) -> Self {
        Self {
            source,
            priority: None,
            kind: LeafKind::default(),
            callback: None,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_kind(mut self, kind: LeafKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }
}

/// Translated pattern together with its source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pattern {
    source: PatternSource,
    #[serde(skip)]
    hir: HirKind,
}

impl Pattern {
    pub fn new(source: PatternSource) -> Result<Self, RegexConversionError> {
        let hir = match &source {
            PatternSource::Token(text) => HirKind::literal(text),
            PatternSource::Regex(pattern) => HirKind::parse(pattern)?,
        };
        Ok(Self { source, hir })
    }

    pub fn source(&self) -> &PatternSource {
        &self.source
    }

    pub fn text(&self) -> &str {
        self.source.text()
    }

    pub fn hir(&self) -> &HirKind {
        &self.hir
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaf {
    pub pattern: Pattern,
    pub priority: u32,
    pub kind: LeafKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
}

impl Leaf {
    /// Translate the pattern and settle the priority.
    pub fn from_spec(spec: LeafSpec) -> Result<Self, RegexConversionError> {
        let pattern = Pattern::new(spec.source)?;
        let priority = spec.priority.unwrap_or_else(|| pattern.hir().priority());
        Ok(Self {
            pattern,
            priority,
            kind: spec.kind,
            callback: spec.callback,
        })
    }
}

impl TryFrom<LeafSpec> for Leaf {
    type Error = RegexConversionError;

    fn try_from(spec: LeafSpec) -> Result<Self, Self::Error> {
        Self::from_spec(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_priority_from_pattern() {
        let keyword = Leaf::from_spec(LeafSpec::token("fast")).unwrap();
        let ident = Leaf::from_spec(LeafSpec::regex("[a-z]+")).unwrap();
        assert_eq!(keyword.priority, 8);
        assert_eq!(ident.priority, 1);
    }

    #[test]
    fn explicit_priority_wins() {
        let leaf = Leaf::from_spec(LeafSpec::token("fast").with_priority(10)).unwrap();
        assert_eq!(leaf.priority, 10);
    }

    #[test]
    fn token_is_not_a_regex() {
        let leaf = Leaf::from_spec(LeafSpec::token("a+b")).unwrap();
        assert_eq!(leaf.pattern.hir(), &HirKind::literal("a+b"));
        assert_eq!(leaf.pattern.text(), "a+b");
    }

    #[test]
    fn invalid_regex() {
        let err = Leaf::try_from(LeafSpec::regex("(a")).unwrap_err();
        assert!(matches!(err, RegexConversionError::Parse { .. }));
    }

    #[test]
    fn leaf_spec_builder() {
        let spec = LeafSpec::regex("[0-9]+")
            .with_kind(LeafKind::AssociatedValues)
            .with_callback("parse_int");
        assert_eq!(spec.kind, LeafKind::AssociatedValues);
        assert_eq!(spec.callback.as_deref(), Some("parse_int"));
        assert_eq!(spec.priority, None);
    }
}
