//! Diagnostics for lexer patterns.
//!
//! Every message points into the source text of one leaf's pattern;
//! related locations may point into other leaves.

mod message;
mod printer;


use lexforge_automata::{RegexConversionError, Span};

pub use message::{DiagnosticKind, DiagnosticMessage, RelatedInfo, Severity};
pub use printer::DiagnosticsPrinter;

use crate::graph::GraphError;
use crate::leaf::{Leaf, LeafId};

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Create a diagnostic of `kind` at `range` within `leaf`'s pattern.
    ///
    /// Uses the kind's default message. Call `.message()` on the builder to override.
    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        leaf: LeafId,
        range: Span,
    ) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::with_default_message(kind, leaf, range),
        }
    }

    /// Report a pattern that failed to translate. Errors without a location
    /// cover the whole pattern.
    pub fn report_regex_error(&mut self, leaf: LeafId, pattern: &str, err: &RegexConversionError) {
        let range = err.span().unwrap_or(Span::new(0, pattern.len()));
        let builder = match err {
            RegexConversionError::Parse { message, .. } => self
                .report(DiagnosticKind::InvalidPattern, leaf, range)
                .message(message),
            RegexConversionError::Unsupported { construct, .. } => self
                .report(DiagnosticKind::UnsupportedConstruct, leaf, range)
                .message(construct.to_string()),
            RegexConversionError::UnknownProperty { message, .. } => self
                .report(DiagnosticKind::UnknownClass, leaf, range)
                .message(message),
            RegexConversionError::InvalidQuantifierBounds { min, max } => {
                let max = max.map(|m| m.to_string()).unwrap_or_default();
                self.report(DiagnosticKind::InvalidRepetition, leaf, range)
                    .message(format!("{{{min},{max}}}"))
            }
        };
        builder.emit();
    }

    /// One diagnostic per priority conflict, anchored on the first tying
    /// leaf with the others as related locations.
    pub fn from_graph_errors(errors: &[GraphError], leaves: &[Leaf]) -> Self {
        let whole = |leaf: LeafId| Span::new(0, leaves[leaf as usize].pattern.text().len());

        let mut diagnostics = Self::new();
        for err in errors {
            let GraphError::MultipleLeavesWithSamePriority {
                leaves: tied,
                priority,
            } = err;
            let Some((&first, rest)) = tied.split_first() else {
                continue;
            };
            let mut builder = diagnostics
                .report(DiagnosticKind::AmbiguousPriority, first, whole(first))
                .message(priority.to_string());
            for &other in rest {
                builder = builder.related_to(
                    format!("leaf {other} matches the same input"),
                    other,
                    whole(other),
                );
            }
            builder.emit();
        }
        diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    pub fn printer<'s>(&self) -> DiagnosticsPrinter<'_, 's> {
        DiagnosticsPrinter::new(self)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticMessage;
    type IntoIter = std::slice::Iter<'a, DiagnosticMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl DiagnosticBuilder<'_> {
    /// Provide custom detail, rendered using the kind's template.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        let detail = msg.into();
        self.message.message = self.message.kind.message(Some(&detail));
        self
    }

    pub fn related_to(mut self, msg: impl Into<String>, leaf: LeafId, range: Span) -> Self {
        self.message.related.push(RelatedInfo::new(leaf, range, msg));
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}
