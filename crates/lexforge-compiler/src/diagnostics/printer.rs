//! Builder-pattern printer for rendering diagnostics against pattern sources.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use lexforge_automata::Span;

use super::Diagnostics;
use super::message::Severity;

pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    /// Pattern text per leaf, indexed by leaf id.
    sources: Vec<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            sources: Vec::new(),
            colored: false,
        }
    }

    /// Pattern sources in leaf order. Diagnostics for leaves without a
    /// source fall back to one-line text.
    pub fn sources(mut self, sources: impl IntoIterator<Item = &'s str>) -> Self {
        self.sources = sources.into_iter().collect();
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            let Some(&source) = self.sources.get(diag.leaf as usize) else {
                writeln!(w, "{diag}")?;
                continue;
            };

            let mut snippet = Snippet::source(source).line_start(1).annotation(
                AnnotationKind::Primary
                    .span(adjust_range(diag.range, source.len()))
                    .label(&diag.message),
            );
            let mut elsewhere = Vec::new();
            for related in &diag.related {
                if related.leaf == diag.leaf {
                    snippet = snippet.annotation(
                        AnnotationKind::Context
                            .span(adjust_range(related.range, source.len()))
                            .label(&related.message),
                    );
                } else if let Some(&other) = self.sources.get(related.leaf as usize) {
                    elsewhere.push(
                        Snippet::source(other).line_start(1).annotation(
                            AnnotationKind::Context
                                .span(adjust_range(related.range, other.len()))
                                .label(&related.message),
                        ),
                    );
                }
            }

            let level = severity_to_level(diag.severity());
            let mut group = level.primary_title(&diag.message).element(snippet);
            for other in elsewhere {
                group = group.element(other);
            }
            for hint in &diag.hints {
                group = group.element(Level::HELP.message(hint.as_str()));
            }

            let report: Vec<Group> = vec![group];
            write!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

fn adjust_range(range: Span, limit: usize) -> std::ops::Range<usize> {
    if range.start == range.end {
        return range.start..(range.start + 1).min(limit);
    }
    range.range()
}
