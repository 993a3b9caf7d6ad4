use std::collections::{HashMap, VecDeque};

use regex_automata::Input;
use regex_automata::dfa::{Automaton, dense};

use super::*;
use crate::DfaConversionError;
use crate::hir::HirKind;
use crate::nfa::Compiler;

fn build_with(patterns: &[HirKind], config: Config) -> Dfa {
    let nfa = Compiler::new().compile(patterns).unwrap();
    Determinizer::new().with_config(config).build(&nfa).unwrap()
}

fn build(patterns: &[&str]) -> Dfa {
    let hirs: Vec<_> = patterns.iter().map(|p| HirKind::parse(p).unwrap()).collect();
    build_with(&hirs, Config::default())
}

/// Patterns matching all of `input`.
fn full_match<'d>(dfa: &'d Dfa, input: &[u8]) -> &'d [PatternId] {
    let id = input
        .iter()
        .fold(dfa.start(), |id, &byte| dfa.next_state(id, byte));
    dfa.state(id).matches()
}

/// Walk both automata in lockstep and check every reachable pair agrees.
fn assert_equivalent(a: &Dfa, b: &Dfa) {
    let mut pairs: HashMap<DfaStateId, DfaStateId> = HashMap::new();
    let mut queue = VecDeque::from([(a.start(), b.start())]);
    while let Some((x, y)) = queue.pop_front() {
        if let Some(&seen) = pairs.get(&x) {
            assert_eq!(seen, y, "state {x} maps to both {seen} and {y}");
            continue;
        }
        pairs.insert(x, y);
        assert_eq!(a.state(x).matches(), b.state(y).matches());
        assert_eq!(a.is_dead(x), b.is_dead(y));
        for byte in 0..=u8::MAX {
            queue.push_back((a.next_state(x, byte), b.next_state(y, byte)));
        }
    }
}

#[test]
fn dead_state_is_zero() {
    let dfa = build(&["abc"]);
    assert!(dfa.is_dead(DEAD));
    assert!(dfa.state(DEAD).transitions().iter().all(|&t| t == DEAD));
    assert!(!dfa.is_match(DEAD));
    assert_eq!(dfa.start(), 1);
}

#[test]
fn two_classes_two_patterns() {
    insta::assert_snapshot!(build(&["[a-y]", "z"]), @r"
     00: dead
    ^01: 61-79 => 2, 7A => 3
     02: match(0)
     03: match(1)
    ");
}

#[test]
fn literal_is_a_chain() {
    let text = "a string";
    let dfa = build_with(&[HirKind::literal(text)], Config::default());

    assert_eq!(dfa.len(), 10);
    let mut id = dfa.start();
    for (i, &byte) in text.as_bytes().iter().enumerate() {
        assert_eq!(id, i as DfaStateId + 1);
        for other in 0..=u8::MAX {
            if other != byte {
                assert!(dfa.is_dead(dfa.next_state(id, other)));
            }
        }
        id = dfa.next_state(id, byte);
    }
    assert_eq!(id, 9);
    let matching: Vec<_> = (0..dfa.len() as DfaStateId)
        .filter(|&id| dfa.is_match(id))
        .collect();
    assert_eq!(matching, vec![9]);
}

#[test]
fn bounded_repetition_states() {
    let dfa = build(&["a{3,5}"]);
    let mut id = dfa.start();
    let mut accepting = Vec::new();
    for _ in 0..5 {
        id = dfa.next_state(id, b'a');
        accepting.push(dfa.is_match(id));
    }
    assert_eq!(accepting, vec![false, false, true, true, true]);
    assert!(dfa.is_dead(dfa.next_state(id, b'a')));
    assert_eq!(dfa.len(), 7);
}

#[test]
fn overlapping_matches_are_kept() {
    let dfa = build(&["if", "[a-z]+"]);
    assert_eq!(full_match(&dfa, b"if"), &[0, 1]);
    assert_eq!(full_match(&dfa, b"i"), &[1]);
    assert_eq!(full_match(&dfa, b"if_"), &[] as &[PatternId]);
    assert_eq!(dfa.pattern_ids(), &[1, 0]);
}

#[test]
fn find_longest() {
    let dfa = build(&["ab", "abcd"]);
    assert_eq!(dfa.find_longest(b"abcde"), Some((4, &[1][..])));
    assert_eq!(dfa.find_longest(b"abc"), Some((2, &[0][..])));
    assert_eq!(dfa.find_longest(b"a"), None);

    let empty = build(&["x*"]);
    assert_eq!(empty.find_longest(b"y"), Some((0, &[0][..])));
}

#[test]
fn byte_classes_do_not_change_the_automaton() {
    let sets: &[&[&str]] = &[
        &["[a-y]", "z"],
        &["[a-zA-Z_][a-zA-Z0-9_]*", "fast", "[0-9]+(\\.[0-9]+)?"],
        &[r"\p{Greek}+", ".", "[^a-z]{2}"],
        &["f(ee)?", "a{3,5}", "(x|yz)*?w"],
    ];
    for patterns in sets {
        let hirs: Vec<_> = patterns.iter().map(|p| HirKind::parse(p).unwrap()).collect();
        let reduced = build_with(&hirs, Config::default());
        let full = build_with(&hirs, Config::default().with_byte_classes(false));

        assert!(full.byte_classes().is_singleton());
        assert!(reduced.byte_classes().alphabet_len() < 256);
        assert_equivalent(&reduced, &full);
        assert_eq!(reduced.len(), full.len());
        assert_eq!(reduced.pattern_ids(), full.pattern_ids());
    }
}

#[test]
fn agrees_with_regex_automata() {
    let patterns = [
        "[a-zA-Z_][a-zA-Z0-9_]*",
        "a{3,5}",
        "f(ee)?",
        r"[α-ω]+\d",
        "(ab|a)(bc|c)?",
        "[^x]y",
    ];
    let inputs: &[&[u8]] = &[
        b"",
        b"a",
        b"aaa",
        b"aaaaaa",
        b"f",
        b"fe",
        b"fee",
        b"abc",
        b"ac",
        b"_x9",
        "αβ7".as_bytes(),
        "ω٣".as_bytes(),
        "éy".as_bytes(),
        b"xy",
        &[0xFF, b'y'],
        &[0xED, 0xA0, 0x80, b'y'],
    ];

    for pattern in patterns {
        let dfa = build(&[pattern]);
        let oracle = dense::DFA::new(&format!("^(?:{pattern})$")).unwrap();
        for &input in inputs {
            let expected = oracle.try_search_fwd(&Input::new(input)).unwrap().is_some();
            assert_eq!(
                !full_match(&dfa, input).is_empty(),
                expected,
                "{pattern} on {input:?}"
            );
        }
    }
}

#[test]
fn unmatchable_patterns_start_dead() {
    let dfa = build_with(&[HirKind::alternation(Vec::new())], Config::default());
    assert_eq!(dfa.start(), DEAD);
    assert_eq!(dfa.len(), 1);
    assert!(dfa.pattern_ids().is_empty());
}

#[test]
fn state_limit() {
    let nfa = Compiler::new().compile(&[HirKind::literal("abcdef")]).unwrap();
    let err = Determinizer::new()
        .with_config(Config::default().with_state_limit(4))
        .build(&nfa)
        .unwrap_err();
    assert_eq!(err, DfaConversionError::StateLimitExceeded { limit: 4 });
}
