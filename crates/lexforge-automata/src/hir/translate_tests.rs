use super::*;
use crate::{Construct, RegexConversionError, Span};

fn class(ranges: &[(char, char)]) -> HirKind {
    HirKind::Class(ranges.iter().map(|&(a, b)| ClassRange::new(a, b)).collect())
}

fn parse(pattern: &str) -> HirKind {
    HirKind::parse(pattern).unwrap()
}

#[test]
fn literal_string() {
    assert_eq!(HirKind::literal("ab"), HirKind::Literal(vec!['a', 'b']));
    assert_eq!(HirKind::literal(""), HirKind::Empty);
}

#[test]
fn concatenated_literals_merge() {
    assert_eq!(parse("abc"), HirKind::literal("abc"));
    assert_eq!(parse(r"a\.b"), HirKind::literal("a.b"));
}

#[test]
fn alternation_keeps_branch_order() {
    assert_eq!(
        parse("foo|bar"),
        HirKind::Alternation(vec![HirKind::literal("foo"), HirKind::literal("bar")])
    );
}

#[test]
fn dot_is_full_scalar_range() {
    assert_eq!(parse("."), HirKind::Class(CharacterClass::full()));
    assert_eq!(parse(r"\p{any}"), HirKind::Class(CharacterClass::full()));
}

#[test]
fn repetition_operators() {
    let rep = |min, max, eager| {
        HirKind::Quantification(Quantification {
            min,
            max,
            eager,
            child: Box::new(HirKind::literal("a")),
        })
    };

    assert_eq!(parse("a*"), rep(0, None, true));
    assert_eq!(parse("a+"), rep(1, None, true));
    assert_eq!(parse("a?"), rep(0, Some(1), true));
    assert_eq!(parse("a*?"), rep(0, None, false));
    assert_eq!(parse("a{3}"), rep(3, Some(3), true));
    assert_eq!(parse("a{3,}"), rep(3, None, true));
    assert_eq!(parse("a{3,5}"), rep(3, Some(5), true));
}

#[test]
fn zero_width_repetition_collapses() {
    assert_eq!(parse("a{0}"), HirKind::Empty);
    assert_eq!(parse("xa{0,0}"), HirKind::literal("x"));
}

#[test]
fn invalid_bounds_rejected() {
    let err = HirKind::quantification(HirKind::literal("a"), 5, Some(3), true).unwrap_err();
    assert_eq!(
        err,
        RegexConversionError::InvalidQuantifierBounds {
            min: 5,
            max: Some(3)
        }
    );
    assert_eq!(err.to_string(), "invalid repetition bounds {5,3}");
}

#[test]
fn groups_are_kept() {
    assert_eq!(
        parse("f(ee)?"),
        HirKind::Concat(vec![
            HirKind::literal("f"),
            HirKind::Quantification(Quantification {
                min: 0,
                max: Some(1),
                eager: true,
                child: Box::new(HirKind::group(HirKind::literal("ee"))),
            }),
        ])
    );
    assert_eq!(parse("(?:ab)"), HirKind::group(HirKind::literal("ab")));
    assert_eq!(parse("(?P<x>ab)"), HirKind::group(HirKind::literal("ab")));
}

#[test]
fn bracketed_classes() {
    assert_eq!(parse("[a-y]"), class(&[('a', 'y')]));
    assert_eq!(parse("[a-cx]"), class(&[('a', 'c'), ('x', 'x')]));
    assert_eq!(
        parse("[^a]"),
        class(&[('\0', '`'), ('b', char::MAX)])
    );
}

#[test]
fn class_set_algebra() {
    assert_eq!(parse("[a-z&&[^aeiou]]"), {
        let mut set: CharacterClass = [ClassRange::new('a', 'z')].into_iter().collect();
        set.difference(&"aeiou".chars().map(ClassRange::single).collect());
        HirKind::Class(set)
    });
    assert_eq!(parse("[a-z--b-y]"), class(&[('a', 'a'), ('z', 'z')]));
    assert_eq!(parse("[a-m~~h-z]"), class(&[('a', 'g'), ('n', 'z')]));
}

#[test]
fn posix_classes() {
    assert_eq!(parse("[[:digit:]]"), class(&[('0', '9')]));
    assert_eq!(parse("[[:xdigit:]]"), class(&[('0', '9'), ('A', 'F'), ('a', 'f')]));
    assert_eq!(parse("[[:word:]]"), class(&[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')]));
}

#[test]
fn unicode_properties_resolve() {
    let HirKind::Class(greek) = parse(r"\p{Greek}") else {
        panic!("expected a class");
    };
    assert!(greek.contains('α'));
    assert!(!greek.contains('a'));

    let HirKind::Class(letters) = parse(r"[\pL&&\p{ascii}]") else {
        panic!("expected a class");
    };
    assert_eq!(letters, [ClassRange::new('A', 'Z'), ClassRange::new('a', 'z')].into_iter().collect());

    let HirKind::Class(digits) = parse(r"\d") else {
        panic!("expected a class");
    };
    assert!(digits.contains('7'));
    assert!(digits.contains('٣'));
    assert!(!digits.is_ascii());
}

#[test]
fn negated_property() {
    let HirKind::Class(not_ascii) = parse(r"\P{ascii}") else {
        panic!("expected a class");
    };
    assert!(!not_ascii.contains('a'));
    assert!(not_ascii.contains('é'));
}

#[test]
fn unknown_property_is_an_error() {
    let err = HirKind::parse(r"a\p{NotAProperty}").unwrap_err();
    assert!(matches!(err, RegexConversionError::UnknownProperty { .. }));
    assert_eq!(err.span(), Some(Span::new(1, 17)));
}

#[test]
fn anchors_rejected() {
    let err = HirKind::parse("^abc").unwrap_err();
    assert_eq!(
        err,
        RegexConversionError::Unsupported {
            construct: Construct::Anchor,
            span: Span::new(0, 1),
        }
    );

    let err = HirKind::parse(r"a\b").unwrap_err();
    assert!(matches!(
        err,
        RegexConversionError::Unsupported {
            construct: Construct::Anchor,
            ..
        }
    ));
}

#[test]
fn flags_rejected() {
    for pattern in ["(?i)abc", "(?i:abc)", "a(?s-m:.)"] {
        let err = HirKind::parse(pattern).unwrap_err();
        assert!(
            matches!(
                err,
                RegexConversionError::Unsupported {
                    construct: Construct::Flags,
                    ..
                }
            ),
            "{pattern}: {err:?}"
        );
    }
}

#[test]
fn backreferences_and_lookaround_rejected() {
    let err = HirKind::parse(r"(a)\1").unwrap_err();
    assert!(matches!(
        err,
        RegexConversionError::Unsupported {
            construct: Construct::Backreference,
            ..
        }
    ));

    let err = HirKind::parse(r"a(?=b)").unwrap_err();
    assert!(matches!(
        err,
        RegexConversionError::Unsupported {
            construct: Construct::Lookaround,
            ..
        }
    ));
}

#[test]
fn possessive_quantifier_is_a_parse_error() {
    let err = HirKind::parse("a*+").unwrap_err();
    assert!(matches!(err, RegexConversionError::Parse { .. }));
}

#[test]
fn priority_by_specificity() {
    assert_eq!(HirKind::Empty.priority(), 0);
    assert_eq!(parse("fast").priority(), 8);
    assert_eq!(parse("[a-z]").priority(), 1);
    assert_eq!(parse("[a-z]+").priority(), 1);
    assert_eq!(parse("[a-z]*").priority(), 0);
    assert_eq!(parse("ab?").priority(), 2);
    assert_eq!(parse("a{3,5}").priority(), 6);
    assert_eq!(parse("foo|ba").priority(), 4);
    assert_eq!(parse("[a-zA-Z_][a-zA-Z0-9_]*").priority(), 1);
}

#[test]
fn display_renders_regex_syntax() {
    insta::assert_snapshot!(parse(r"f(ee)?|a\.b*?|[a-c]{2,3}"), @r"(?:f(ee)?|a\.b*?|[a-c]{2,3})");
    insta::assert_snapshot!(parse("(?:ab)+"), @"(ab)+");
}
