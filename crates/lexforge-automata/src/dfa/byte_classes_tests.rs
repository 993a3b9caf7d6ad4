use super::*;
use crate::hir::{ByteSet, ClassRange, HirKind};
use crate::nfa::{Compiler, Nfa, State};

fn nfa(patterns: &[&str]) -> Nfa {
    let hirs: Vec<_> = patterns.iter().map(|p| HirKind::parse(p).unwrap()).collect();
    Compiler::new().compile(&hirs).unwrap()
}

#[test]
fn singletons() {
    let classes = ByteClasses::singletons();
    assert!(classes.is_singleton());
    assert_eq!(classes.alphabet_len(), 256);
    assert_eq!(classes.get(0x7A), 0x7A);
    assert!(classes.representatives().eq(0..=u8::MAX));
}

#[test]
fn classes_follow_transition_boundaries() {
    let classes = ByteClasses::from_nfa(&nfa(&["[a-y]", "z"]));

    assert_eq!(classes.alphabet_len(), 4);
    assert_eq!(
        classes.representatives().collect::<Vec<_>>(),
        vec![0x00, 0x61, 0x7A, 0x7B]
    );
    assert_eq!(
        classes.elements(1),
        ByteSet::new([ClassRange::new(b'a', b'y')])
    );
    insta::assert_snapshot!(format!("{classes:?}"), @"ByteClasses(0 => [00-60], 1 => [61-79], 2 => [7A], 3 => [7B-FF])");
}

#[test]
fn no_transition_splits_a_class() {
    let nfa = nfa(&["[a-z_][a-z0-9_]*", "[0-9]+", r"\p{Greek}+", "fn|for", "."]);
    let classes = ByteClasses::from_nfa(&nfa);
    assert!(classes.alphabet_len() < 256);

    for state in nfa.states() {
        let transitions = match state {
            State::ByteRange { trans } => vec![*trans],
            State::Sparse { transitions } => transitions.to_vec(),
            _ => continue,
        };
        for trans in transitions {
            for byte in 1..=u8::MAX {
                if classes.get(byte) == classes.get(byte - 1) {
                    assert_eq!(trans.matches(byte), trans.matches(byte - 1), "{byte:02X}");
                }
            }
        }
    }
}

#[test]
fn elements_partition_all_bytes() {
    let classes = ByteClasses::from_nfa(&nfa(&["[α-ω]", "[a-f]+"]));
    let total: usize = (0..classes.alphabet_len())
        .map(|class| classes.elements(class as u8).len())
        .sum();
    assert_eq!(total, 256);
}
