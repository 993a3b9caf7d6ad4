//! Scalar-level pattern IR.
//!
//! `HirKind` only represents constructs expressible as finite automata.
//! Values come from a literal token (`HirKind::literal`) or from a regex
//! (`HirKind::parse`), and are consumed by the NFA compiler.

mod class;
mod translate;

#[cfg(test)]
mod translate_tests;

use std::fmt;

pub use class::{Bound, ByteSet, CharacterClass, ClassRange, RangeSet};

use crate::RegexConversionError;

/// Weight of one literal scalar in the default priority.
const LITERAL_WEIGHT: u32 = 2;
/// Weight of one character class in the default priority.
const CLASS_WEIGHT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HirKind {
    /// Matches the empty string.
    Empty,
    /// Sequence of scalars matched verbatim.
    Literal(Vec<char>),
    Concat(Vec<HirKind>),
    /// Leftmost branch has priority.
    Alternation(Vec<HirKind>),
    Quantification(Quantification),
    Class(CharacterClass),
    Group(Box<HirKind>),
}

/// Bounded or unbounded repetition of a child pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantification {
    pub min: u32,
    /// `None` for unbounded repetition.
    pub max: Option<u32>,
    /// Eager repetition tries to consume more first.
    pub eager: bool,
    pub child: Box<HirKind>,
}

impl HirKind {
    /// Literal token pattern.
    pub fn literal(text: &str) -> Self {
        if text.is_empty() {
            return Self::Empty;
        }
        Self::Literal(text.chars().collect())
    }

    pub fn class(class: CharacterClass) -> Self {
        Self::Class(class)
    }

    pub fn group(child: HirKind) -> Self {
        Self::Group(Box::new(child))
    }

    /// Concatenation with nested concatenations flattened, adjacent literals
    /// merged and `Empty` items dropped.
    pub fn concat(items: Vec<HirKind>) -> Self {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            push_concat_item(&mut out, item);
        }

        match out.len() {
            0 => Self::Empty,
            1 => out.pop().unwrap_or(Self::Empty),
            _ => Self::Concat(out),
        }
    }

    /// Alternation; an empty alternation matches nothing.
    pub fn alternation(mut branches: Vec<HirKind>) -> Self {
        match branches.len() {
            0 => Self::Class(CharacterClass::empty()),
            1 => branches.pop().unwrap_or(Self::Empty),
            _ => Self::Alternation(branches),
        }
    }

    /// Validated repetition. `{0,0}` collapses to `Empty`.
    pub fn quantification(
        child: HirKind,
        min: u32,
        max: Option<u32>,
        eager: bool,
    ) -> Result<Self, RegexConversionError> {
        if let Some(max) = max {
            if max < min {
                return Err(RegexConversionError::InvalidQuantifierBounds {
                    min,
                    max: Some(max),
                });
            }
            if max == 0 {
                return Ok(Self::Empty);
            }
            if min == 1 && max == 1 {
                return Ok(child);
            }
        }

        Ok(Self::Quantification(Quantification {
            min,
            max,
            eager,
            child: Box::new(child),
        }))
    }

    /// Default leaf priority: longer and more specific patterns weigh more.
    ///
    /// Literal scalars weigh 2, classes 1; concatenations sum, alternations
    /// take their weakest branch, optional and looping repetitions weigh 0.
    pub fn priority(&self) -> u32 {
        match self {
            Self::Empty => 0,
            Self::Literal(scalars) => {
                LITERAL_WEIGHT.saturating_mul(u32::try_from(scalars.len()).unwrap_or(u32::MAX))
            }
            Self::Concat(items) => items
                .iter()
                .fold(0u32, |acc, item| acc.saturating_add(item.priority())),
            Self::Alternation(branches) => {
                branches.iter().map(HirKind::priority).min().unwrap_or(0)
            }
            Self::Quantification(q) if q.min == 0 => 0,
            Self::Quantification(q) => q.child.priority().saturating_mul(q.min),
            Self::Class(_) => CLASS_WEIGHT,
            Self::Group(child) => child.priority(),
        }
    }

    /// True when every scalar this pattern can match is ASCII.
    pub fn is_ascii(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Literal(scalars) => scalars.iter().all(char::is_ascii),
            Self::Concat(items) | Self::Alternation(items) => items.iter().all(HirKind::is_ascii),
            Self::Quantification(q) => q.child.is_ascii(),
            Self::Class(class) => class.is_ascii(),
            Self::Group(child) => child.is_ascii(),
        }
    }
}

/// Regex-like rendering for debugging. Alternations are always grouped.
impl fmt::Display for HirKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("(?:)"),
            Self::Literal(scalars) => {
                for c in scalars {
                    if regex_syntax::is_meta_character(*c) {
                        write!(f, "\\{c}")?;
                    } else {
                        write!(f, "{}", c.escape_debug())?;
                    }
                }
                Ok(())
            }
            Self::Concat(items) => items.iter().try_for_each(|item| write!(f, "{item}")),
            Self::Alternation(branches) => {
                f.write_str("(?:")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{branch}")?;
                }
                f.write_str(")")
            }
            Self::Quantification(q) => {
                match q.child.as_ref() {
                    Self::Literal(s) if s.len() > 1 => write!(f, "(?:{})", q.child)?,
                    Self::Concat(_) => write!(f, "(?:{})", q.child)?,
                    child => write!(f, "{child}")?,
                }
                match (q.min, q.max) {
                    (0, None) => f.write_str("*")?,
                    (1, None) => f.write_str("+")?,
                    (0, Some(1)) => f.write_str("?")?,
                    (min, None) => write!(f, "{{{min},}}")?,
                    (min, Some(max)) if min == max => write!(f, "{{{min}}}")?,
                    (min, Some(max)) => write!(f, "{{{min},{max}}}")?,
                }
                if !q.eager {
                    f.write_str("?")?;
                }
                Ok(())
            }
            Self::Class(class) => write!(f, "{class}"),
            Self::Group(child) => write!(f, "({child})"),
        }
    }
}

fn push_concat_item(out: &mut Vec<HirKind>, item: HirKind) {
    match item {
        HirKind::Empty => {}
        HirKind::Concat(nested) => {
            for item in nested {
                push_concat_item(out, item);
            }
        }
        HirKind::Literal(next) => match out.last_mut() {
            Some(HirKind::Literal(prev)) => prev.extend(next),
            _ => out.push(HirKind::Literal(next)),
        },
        item => out.push(item),
    }
}
