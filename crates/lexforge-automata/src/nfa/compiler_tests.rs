use super::*;
use crate::NfaConstructionError;
use crate::hir::HirKind;

fn compile(patterns: &[&str]) -> Nfa {
    let hirs: Vec<_> = patterns.iter().map(|p| HirKind::parse(p).unwrap()).collect();
    Compiler::new().compile(&hirs).unwrap()
}

fn closure(nfa: &Nfa, id: StateId, set: &mut Vec<StateId>) {
    if set.contains(&id) {
        return;
    }
    set.push(id);
    match nfa.state(id) {
        State::Union { alternates } => {
            for &alt in alternates.iter() {
                closure(nfa, alt, set);
            }
        }
        State::BinaryUnion { alt1, alt2 } => {
            closure(nfa, *alt1, set);
            closure(nfa, *alt2, set);
        }
        _ => {}
    }
}

/// Patterns matching the whole input.
fn matches(nfa: &Nfa, input: &[u8]) -> Vec<PatternId> {
    let mut current = Vec::new();
    closure(nfa, nfa.start(), &mut current);
    for &byte in input {
        let mut next = Vec::new();
        for &id in &current {
            let target = match nfa.state(id) {
                State::ByteRange { trans } if trans.matches(byte) => Some(trans.next),
                State::Sparse { transitions } => transitions
                    .iter()
                    .find(|t| t.matches(byte))
                    .map(|t| t.next),
                _ => None,
            };
            if let Some(target) = target {
                closure(nfa, target, &mut next);
            }
        }
        current = next;
    }

    let mut ids: Vec<_> = current
        .iter()
        .filter_map(|&id| match nfa.state(id) {
            State::Match { pattern_id } => Some(*pattern_id),
            _ => None,
        })
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn is_match(nfa: &Nfa, input: &[u8]) -> bool {
    !matches(nfa, input).is_empty()
}

#[test]
fn literal_chain() {
    insta::assert_snapshot!(compile(&["ab"]), @r"
    ^00: 61 => 1
     01: 62 => 2
     02: match(0)
    ");
}

#[test]
fn patterns_joined_in_order() {
    insta::assert_snapshot!(compile(&["a", "b"]), @r"
    ^00: binary-union(1, 2)
     01: 61 => 3
     02: 62 => 4
     03: match(0)
     04: match(1)
    ");
}

#[test]
fn ascii_class_is_one_sparse_state() {
    insta::assert_snapshot!(compile(&["[a-cx]"]), @r"
    ^00: sparse(61-63 => 1, 78 => 1)
     01: match(0)
    ");
}

#[test]
fn eager_and_lazy_star() {
    insta::assert_snapshot!(compile(&["a*"]), @r"
    ^00: binary-union(1, 2)
     01: 61 => 0
     02: match(0)
    ");
    insta::assert_snapshot!(compile(&["a*?"]), @r"
    ^00: binary-union(1, 2)
     01: match(0)
     02: 61 => 0
    ");
}

#[test]
fn no_placeholder_states_survive() {
    let nfa = compile(&["f(ee)?", "a{2,4}b*", "(x|y|z)+?", "[α-ω]|."]);
    for state in nfa.states() {
        if let State::Union { alternates } = state {
            assert!(alternates.len() >= 3, "{nfa}");
        }
    }
}

#[test]
fn literal_accepts_exactly_itself() {
    let text = "a string";
    let nfa = Compiler::new().compile(&[HirKind::literal(text)]).unwrap();
    let bytes = text.as_bytes();

    assert!(is_match(&nfa, bytes));
    for end in 0..bytes.len() {
        assert!(!is_match(&nfa, &bytes[..end]));
    }
    assert!(!is_match(&nfa, b"a strings"));
    for i in 0..bytes.len() {
        for byte in (0..=u8::MAX).filter(|&b| b != bytes[i]) {
            let mut mutated = bytes.to_vec();
            mutated[i] = byte;
            assert!(!is_match(&nfa, &mutated), "{mutated:?}");
        }
    }
}

#[test]
fn bounded_repetition() {
    let nfa = compile(&["a{3,5}"]);
    for n in 0..8 {
        let input = "a".repeat(n);
        assert_eq!(is_match(&nfa, input.as_bytes()), (3..=5).contains(&n), "{n}");
    }
}

#[test]
fn unbounded_repetition() {
    let star = compile(&["a*"]);
    let plus = compile(&["a+"]);
    let at_least = compile(&["(ab){2,}"]);

    assert!(is_match(&star, b""));
    assert!(is_match(&star, b"aaaa"));
    assert!(!is_match(&plus, b""));
    assert!(is_match(&plus, b"a"));
    assert!(!is_match(&at_least, b"ab"));
    assert!(is_match(&at_least, b"abab"));
    assert!(is_match(&at_least, b"ababab"));
    assert!(!is_match(&at_least, b"ababa"));
}

#[test]
fn optional_group() {
    let nfa = compile(&["f(ee)?"]);
    assert!(is_match(&nfa, b"f"));
    assert!(is_match(&nfa, b"fee"));
    assert!(!is_match(&nfa, b"fe"));
    assert!(!is_match(&nfa, b"feee"));
}

#[test]
fn unicode_class_matches_utf8() {
    let nfa = compile(&["[α-ω]"]);
    assert!(is_match(&nfa, "β".as_bytes()));
    assert!(is_match(&nfa, "ω".as_bytes()));
    assert!(!is_match(&nfa, "Ω".as_bytes()));
    assert!(!is_match(&nfa, b"a"));
}

#[test]
fn dot_rejects_invalid_utf8() {
    let nfa = compile(&["."]);
    assert!(is_match(&nfa, b"a"));
    assert!(is_match(&nfa, "€".as_bytes()));
    assert!(is_match(&nfa, "\u{10FFFF}".as_bytes()));
    assert!(!is_match(&nfa, &[0xFF]));
    assert!(!is_match(&nfa, &[0xC0, 0x80]));
    assert!(!is_match(&nfa, &[0xED, 0xA0, 0x80]));
    assert!(!is_match(&nfa, &[0xF4, 0x90, 0x80, 0x80]));
}

#[test]
fn suffix_cache_shares_states() {
    let hir = HirKind::parse(r"\p{Greek}").unwrap();
    let cached = Compiler::new().compile(std::slice::from_ref(&hir)).unwrap();
    let uncached = Compiler::new()
        .with_config(Config::default().with_suffix_cache_capacity(0))
        .compile(std::slice::from_ref(&hir))
        .unwrap();
    let tiny = Compiler::new()
        .with_config(Config::default().with_suffix_cache_capacity(2))
        .compile(std::slice::from_ref(&hir))
        .unwrap();

    assert!(cached.len() < uncached.len());
    let mut buf = [0; 4];
    for c in ['α', 'Ω', 'a', 'ἀ', '€', '\u{1D6A8}'] {
        let bytes = c.encode_utf8(&mut buf).as_bytes();
        let expected = is_match(&uncached, bytes);
        assert_eq!(is_match(&cached, bytes), expected, "{c}");
        assert_eq!(is_match(&tiny, bytes), expected, "{c}");
    }
}

#[test]
fn overlapping_patterns_all_match() {
    let nfa = compile(&["if", "[a-z]+"]);
    assert_eq!(matches(&nfa, b"if"), vec![0, 1]);
    assert_eq!(matches(&nfa, b"iff"), vec![1]);
}

#[test]
fn empty_inputs_match_nothing() {
    let none = Compiler::new().compile(&[]).unwrap();
    assert_eq!(none.states(), &[State::Fail]);
    assert_eq!(none.pattern_len(), 0);

    let empty_class = Compiler::new()
        .compile(&[HirKind::alternation(Vec::new())])
        .unwrap();
    assert!(!is_match(&empty_class, b""));
    assert!(!is_match(&empty_class, b"a"));

    let empty = Compiler::new().compile(&[HirKind::Empty]).unwrap();
    assert!(is_match(&empty, b""));
}

#[test]
fn limits_are_errors() {
    let patterns = [HirKind::literal("a"), HirKind::literal("b")];
    let err = Compiler::new()
        .with_config(Config::default().with_pattern_limit(1))
        .compile(&patterns)
        .unwrap_err();
    assert_eq!(err, NfaConstructionError::PatternLimitExceeded { limit: 1 });

    let err = Compiler::new()
        .with_config(Config::default().with_state_limit(3))
        .compile(&[HirKind::literal("abcdef")])
        .unwrap_err();
    assert_eq!(err, NfaConstructionError::StateLimitExceeded { limit: 3 });
}

#[test]
fn huge_repetition_hits_state_limit() {
    let config = Config::default().with_state_limit(100);
    for pattern in ["a{4000000000}", "a{4000000000,}", "a{1,4294967295}", "(?:ab){4294967295}"] {
        let err = Compiler::new()
            .with_config(config)
            .compile(&[HirKind::parse(pattern).unwrap()])
            .unwrap_err();
        assert_eq!(err, NfaConstructionError::StateLimitExceeded { limit: 100 }, "{pattern}");
    }
}
