//! Pipeline shortcuts shared by the graph and facade tests.

use lexforge_automata::dfa::{Determinizer, Dfa};
use lexforge_automata::hir::HirKind;
use lexforge_automata::nfa::Compiler;

use crate::graph::Graph;
use crate::leaf::{Leaf, LeafId, LeafSpec};

pub fn leaves(specs: Vec<LeafSpec>) -> Vec<Leaf> {
    specs
        .into_iter()
        .map(|spec| Leaf::from_spec(spec).unwrap())
        .collect()
}

pub fn determinize(leaves: &[Leaf]) -> Dfa {
    let hirs: Vec<HirKind> = leaves.iter().map(|leaf| leaf.pattern.hir().clone()).collect();
    let nfa = Compiler::new().compile(&hirs).unwrap();
    Determinizer::new().build(&nfa).unwrap()
}

/// Leaves resolved per DFA state, no optimization.
pub fn unoptimized(specs: Vec<LeafSpec>) -> Graph {
    let leaves = leaves(specs);
    let dfa = determinize(&leaves);
    Graph::from_dfa(leaves, dfa)
}

pub fn optimized(specs: Vec<LeafSpec>) -> Graph {
    let leaves = leaves(specs);
    let dfa = determinize(&leaves);
    Graph::build(leaves, dfa)
}

/// Longest match straight off the DFA, resolving priorities state by state.
pub fn reference_longest_match(leaves: &[Leaf], dfa: &Dfa, input: &[u8]) -> Option<(usize, LeafId)> {
    let resolve = |state| {
        let matches = dfa.state(state).matches();
        let best = matches.iter().map(|&id| leaves[id as usize].priority).max()?;
        let top: Vec<LeafId> = matches
            .iter()
            .copied()
            .filter(|&id| leaves[id as usize].priority == best)
            .collect();
        (top.len() == 1).then(|| top[0])
    };

    let mut state = dfa.start();
    let mut last = resolve(state).map(|leaf| (0, leaf));
    for (i, &byte) in input.iter().enumerate() {
        state = dfa.next_state(state, byte);
        if dfa.is_dead(state) {
            break;
        }
        if let Some(leaf) = resolve(state) {
            last = Some((i + 1, leaf));
        }
    }
    last
}

/// Every string over `alphabet` of length at most `max_len`.
pub fn all_inputs(alphabet: &[u8], max_len: usize) -> Vec<Vec<u8>> {
    let mut out = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &frontier {
            for &byte in alphabet {
                let mut input: Vec<u8> = prefix.clone();
                input.push(byte);
                next.push(input);
            }
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}
