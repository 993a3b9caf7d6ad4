use indoc::indoc;

use super::ByteClass;
use crate::leaf::LeafSpec;
use crate::test_utils::optimized;

#[test]
fn dot() {
    let graph = optimized(vec![LeafSpec::regex("[a-y]"), LeafSpec::token("z")]);

    insta::assert_snapshot!(graph.to_dot(), @r#"
    digraph lexer {
        rankdir=LR;
        node [shape=circle];
        s0 [label="0", shape=doublecircle];
        s1 [label="1 A0", style=filled, fillcolor=green];
        s2 [label="2 A1", style=filled, fillcolor=green];
        s0 -> s1 [label="a-y"];
        s0 -> s2 [label="z"];
    }
    "#);
}

#[test]
fn dot_escapes_quotes_and_backslashes() {
    let graph = optimized(vec![LeafSpec::token("\""), LeafSpec::token("\\")]);

    let dot = graph.to_dot();
    assert!(dot.contains(r#"s0 -> s1 [label="\""];"#));
    assert!(dot.contains(r#"s0 -> s2 [label="\\\\"];"#));
}

#[test]
fn mermaid() {
    let graph = optimized(vec![LeafSpec::regex("[a-y]"), LeafSpec::token("z")]);

    assert_eq!(
        graph.to_mermaid(),
        indoc! {r#"
            flowchart LR
                s0(("0"))
                s1(("1 A0"))
                s2(("2 A1"))
                s0 -- "a-y" --> s1
                s0 -- "z" --> s2
                style s1 fill:#9f9
                style s2 fill:#9f9
        "#}
    );
}

#[test]
fn mermaid_escapes_quotes() {
    let graph = optimized(vec![LeafSpec::token("\"")]);

    assert!(graph.to_mermaid().contains(r##"s0 -- "#quot;" --> s1"##));
}

#[test]
fn class_labels() {
    let label = |ranges: &[(u8, u8)]| {
        let mut class = ByteClass::default();
        for &(start, end) in ranges {
            class.union(&ByteClass::from_range(start, end));
        }
        class.to_string()
    };

    assert_eq!(label(&[(b'a', b'z')]), "a-z");
    assert_eq!(label(&[(b'0', b'9'), (b'_', b'_')]), "0-9 _");
    assert_eq!(label(&[(b'-', b'-'), (b'\\', b'\\')]), r"\- \\");
    assert_eq!(label(&[(b' ', b' '), (b'\n', b'\n')]), r"\x0A \x20");
    assert_eq!(label(&[(0x80, 0xBF)]), r"\x80-\xBF");
    assert_eq!(label(&[(0x00, 0xFF)]), r"\x00-\xFF");
}
