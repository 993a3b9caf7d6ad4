//! Translation from `regex_syntax` ASTs into `HirKind`.
//!
//! Structure (concatenation, alternation, repetition, groups) and bracketed
//! set algebra are translated here. Unicode property and Perl class lookups
//! go through `regex_syntax`'s own translator, which owns the Unicode tables.

use regex_syntax::ast::{
    self, Ast, ClassAsciiKind, ClassBracketed, ClassSet, ClassSetBinaryOpKind, ClassSetItem,
    GroupKind, RepetitionKind, RepetitionRange,
};
use regex_syntax::hir as syntax;

use super::{CharacterClass, ClassRange, HirKind, RangeSet};
use crate::{Construct, RegexConversionError, Span};

impl HirKind {
    /// Parse regex source and translate it.
    pub fn parse(pattern: &str) -> Result<Self, RegexConversionError> {
        let ast = ast::parse::Parser::new()
            .parse(pattern)
            .map_err(parse_error)?;
        Self::from_ast(pattern, &ast)
    }

    /// Translate an already parsed AST. `pattern` is the source it was parsed from.
    pub fn from_ast(pattern: &str, ast: &Ast) -> Result<Self, RegexConversionError> {
        Translator { pattern }.translate(ast)
    }
}

struct Translator<'p> {
    pattern: &'p str,
}

impl Translator<'_> {
    fn translate(&self, ast: &Ast) -> Result<HirKind, RegexConversionError> {
        match ast {
            Ast::Empty(_) => Ok(HirKind::Empty),
            Ast::Flags(set) => Err(unsupported(Construct::Flags, &set.span)),
            Ast::Literal(lit) => Ok(HirKind::Literal(vec![lit.c])),
            Ast::Dot(_) => Ok(HirKind::Class(CharacterClass::full())),
            Ast::Assertion(assertion) => Err(unsupported(Construct::Anchor, &assertion.span)),
            Ast::ClassUnicode(_) | Ast::ClassPerl(_) => self.unicode_class(ast).map(HirKind::Class),
            Ast::ClassBracketed(class) => self.bracketed(class).map(HirKind::Class),
            Ast::Repetition(rep) => {
                let (min, max) = match &rep.op.kind {
                    RepetitionKind::ZeroOrOne => (0, Some(1)),
                    RepetitionKind::ZeroOrMore => (0, None),
                    RepetitionKind::OneOrMore => (1, None),
                    RepetitionKind::Range(RepetitionRange::Exactly(n)) => (*n, Some(*n)),
                    RepetitionKind::Range(RepetitionRange::AtLeast(n)) => (*n, None),
                    RepetitionKind::Range(RepetitionRange::Bounded(m, n)) => (*m, Some(*n)),
                };
                let child = self.translate(&rep.ast)?;
                HirKind::quantification(child, min, max, rep.greedy)
            }
            Ast::Group(group) => {
                if let GroupKind::NonCapturing(flags) = &group.kind {
                    if !flags.items.is_empty() {
                        return Err(unsupported(Construct::Flags, &flags.span));
                    }
                }
                Ok(HirKind::group(self.translate(&group.ast)?))
            }
            Ast::Alternation(alt) => {
                let branches = alt
                    .asts
                    .iter()
                    .map(|ast| self.translate(ast))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(HirKind::alternation(branches))
            }
            Ast::Concat(concat) => {
                let items = concat
                    .asts
                    .iter()
                    .map(|ast| self.translate(ast))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(HirKind::concat(items))
            }
        }
    }

    fn bracketed(&self, class: &ClassBracketed) -> Result<CharacterClass, RegexConversionError> {
        let mut set = self.class_set(&class.kind)?;
        if class.negated {
            set.invert();
        }
        Ok(set)
    }

    fn class_set(&self, set: &ClassSet) -> Result<CharacterClass, RegexConversionError> {
        match set {
            ClassSet::Item(item) => self.class_set_item(item),
            ClassSet::BinaryOp(op) => {
                let mut lhs = self.class_set(&op.lhs)?;
                let rhs = self.class_set(&op.rhs)?;
                match op.kind {
                    ClassSetBinaryOpKind::Intersection => lhs.intersect(&rhs),
                    ClassSetBinaryOpKind::Difference => lhs.difference(&rhs),
                    ClassSetBinaryOpKind::SymmetricDifference => lhs.symmetric_difference(&rhs),
                }
                Ok(lhs)
            }
        }
    }

    fn class_set_item(&self, item: &ClassSetItem) -> Result<CharacterClass, RegexConversionError> {
        match item {
            ClassSetItem::Empty(_) => Ok(CharacterClass::empty()),
            ClassSetItem::Literal(lit) => Ok(CharacterClass::singleton(lit.c)),
            ClassSetItem::Range(range) => Ok(CharacterClass::new([ClassRange::new(
                range.start.c,
                range.end.c,
            )])),
            ClassSetItem::Ascii(ascii) => {
                let mut set = posix_class(&ascii.kind);
                if ascii.negated {
                    set.invert();
                }
                Ok(set)
            }
            ClassSetItem::Unicode(class) => self.unicode_class(&Ast::class_unicode(class.clone())),
            ClassSetItem::Perl(class) => self.unicode_class(&Ast::class_perl(class.clone())),
            ClassSetItem::Bracketed(class) => self.bracketed(class),
            ClassSetItem::Union(union) => {
                let mut set = CharacterClass::empty();
                for item in &union.items {
                    set.union(&self.class_set_item(item)?);
                }
                Ok(set)
            }
        }
    }

    /// Resolve `\p{..}`, `\P{..}`, `\d`, `\s`, `\w` and friends.
    fn unicode_class(&self, ast: &Ast) -> Result<CharacterClass, RegexConversionError> {
        let hir = syntax::translate::Translator::new()
            .translate(self.pattern, ast)
            .map_err(|err| RegexConversionError::UnknownProperty {
                message: err.kind().to_string(),
                span: err.span().into(),
            })?;

        scalar_class(&hir).ok_or_else(|| RegexConversionError::UnknownProperty {
            message: "class does not resolve to a set of scalar values".to_string(),
            span: ast.span().into(),
        })
    }
}

/// Extract the scalar set from a translated class.
///
/// Single-scalar classes come back from `regex_syntax` as literals.
fn scalar_class(hir: &syntax::Hir) -> Option<CharacterClass> {
    match hir.kind() {
        syntax::HirKind::Class(syntax::Class::Unicode(class)) => Some(
            class
                .ranges()
                .iter()
                .map(|r| ClassRange::new(r.start(), r.end()))
                .collect(),
        ),
        syntax::HirKind::Literal(syntax::Literal(bytes)) => {
            let text = std::str::from_utf8(bytes).ok()?;
            let mut chars = text.chars();
            let c = chars.next()?;
            chars.next().is_none().then(|| CharacterClass::singleton(c))
        }
        _ => None,
    }
}

/// POSIX bracket classes such as `[[:alpha:]]`. ASCII only.
fn posix_class(kind: &ClassAsciiKind) -> CharacterClass {
    let ranges: &[(char, char)] = match kind {
        ClassAsciiKind::Alnum => &[('0', '9'), ('A', 'Z'), ('a', 'z')],
        ClassAsciiKind::Alpha => &[('A', 'Z'), ('a', 'z')],
        ClassAsciiKind::Ascii => &[('\x00', '\x7F')],
        ClassAsciiKind::Blank => &[('\t', '\t'), (' ', ' ')],
        ClassAsciiKind::Cntrl => &[('\x00', '\x1F'), ('\x7F', '\x7F')],
        ClassAsciiKind::Digit => &[('0', '9')],
        ClassAsciiKind::Graph => &[('!', '~')],
        ClassAsciiKind::Lower => &[('a', 'z')],
        ClassAsciiKind::Print => &[(' ', '~')],
        ClassAsciiKind::Punct => &[('!', '/'), (':', '@'), ('[', '`'), ('{', '~')],
        ClassAsciiKind::Space => &[('\t', '\r'), (' ', ' ')],
        ClassAsciiKind::Upper => &[('A', 'Z')],
        ClassAsciiKind::Word => &[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')],
        ClassAsciiKind::Xdigit => &[('0', '9'), ('A', 'F'), ('a', 'f')],
    };
    RangeSet::new(ranges.iter().map(|&(a, b)| ClassRange::new(a, b)))
}

fn parse_error(err: ast::Error) -> RegexConversionError {
    let span = Span::from(err.span());
    match err.kind() {
        ast::ErrorKind::UnsupportedBackreference => RegexConversionError::Unsupported {
            construct: Construct::Backreference,
            span,
        },
        ast::ErrorKind::UnsupportedLookAround => RegexConversionError::Unsupported {
            construct: Construct::Lookaround,
            span,
        },
        kind => RegexConversionError::Parse {
            message: kind.to_string(),
            span,
        },
    }
}

fn unsupported(construct: Construct, span: &ast::Span) -> RegexConversionError {
    RegexConversionError::Unsupported {
        construct,
        span: span.into(),
    }
}
