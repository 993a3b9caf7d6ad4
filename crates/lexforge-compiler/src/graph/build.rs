//! Graph construction from a DFA.

use std::collections::{BTreeMap, HashMap, VecDeque};

use indexmap::IndexSet;
use lexforge_automata::dfa::{DEAD, Dfa, DfaStateId};
use lexforge_automata::hir::{ByteSet, ClassRange};
use lexforge_automata::nfa::PatternId;

use super::{ByteClass, Graph, GraphError, State, StateData, StateType};
use crate::leaf::{Leaf, LeafId};

impl Graph {
    /// Build and fully optimize the graph for `leaves`.
    ///
    /// Pattern `i` of `dfa` must belong to `leaves[i]`.
    ///
    /// # Panics
    /// Panics if `dfa` matches a pattern with no leaf in `leaves`.
    pub fn build(leaves: Vec<Leaf>, dfa: Dfa) -> Self {
        let mut graph = Self::from_dfa(leaves, dfa);
        graph.optimize();
        graph
    }

    /// Direct translation of `dfa` with leaves resolved per state and no
    /// optimization applied. The dead state is dropped; the root is 0.
    ///
    /// # Panics
    /// Panics if `dfa` matches a pattern with no leaf in `leaves`.
    pub fn from_dfa(leaves: Vec<Leaf>, dfa: Dfa) -> Self {
        if let Some(&id) = dfa.pattern_ids().iter().find(|&&id| id as usize >= leaves.len()) {
            panic!("DFA pattern {id} has no leaf ({} leaves given)", leaves.len());
        }
        let order = reachable(&dfa);
        let ids: HashMap<DfaStateId, State> = order
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new as State))
            .collect();

        let mut errors = IndexSet::new();
        let mut states = Vec::with_capacity(order.len().max(1));
        for &old in &order {
            let accept = match resolve(&leaves, dfa.state(old).matches()) {
                Ok(accept) => accept,
                Err(err) => {
                    errors.insert(err);
                    None
                }
            };
            states.push(StateData {
                state_type: StateType {
                    accept,
                    early: None,
                },
                normal: edges(&dfa, old, &ids),
                back_edges: Vec::new(),
            });
        }
        if states.is_empty() {
            // Nothing matches; keep a lone root that rejects every byte.
            states.push(StateData::default());
        }

        log::debug!(
            "graph: {} states from {} DFA states, {} priority conflicts",
            states.len(),
            dfa.len(),
            errors.len()
        );

        let mut graph = Self {
            leaves,
            dfa,
            states,
            root: 0,
            errors: errors.into_iter().collect(),
        };
        graph.recompute_back_edges();
        graph
    }
}

/// Live DFA states in BFS order from the start.
fn reachable(dfa: &Dfa) -> Vec<DfaStateId> {
    let start = dfa.start();
    if dfa.is_dead(start) {
        return Vec::new();
    }

    let mut seen = vec![false; dfa.len()];
    seen[start as usize] = true;
    let mut order = vec![start];
    let mut queue = VecDeque::from([start]);
    while let Some(id) = queue.pop_front() {
        for &next in dfa.state(id).transitions() {
            if dfa.is_dead(next) || seen[next as usize] {
                continue;
            }
            seen[next as usize] = true;
            order.push(next);
            queue.push_back(next);
        }
    }
    order
}

/// Outgoing edges of `id`, one per live target, sorted by target.
fn edges(dfa: &Dfa, id: DfaStateId, ids: &HashMap<DfaStateId, State>) -> Vec<(ByteClass, State)> {
    let transitions = dfa.state(id).transitions();
    let mut grouped: BTreeMap<State, Vec<ClassRange<u8>>> = BTreeMap::new();

    let mut start = 0;
    while start < transitions.len() {
        let target = transitions[start];
        let mut end = start;
        while end + 1 < transitions.len() && transitions[end + 1] == target {
            end += 1;
        }
        if target != DEAD {
            grouped
                .entry(ids[&target])
                .or_default()
                .push(ClassRange::new(start as u8, end as u8));
        }
        start = end + 1;
    }

    grouped
        .into_iter()
        .map(|(target, ranges)| (ByteClass::new(ByteSet::new(ranges)), target))
        .collect()
}

/// Highest-priority leaf among `matches`. Ties are an error listing every
/// tying leaf.
fn resolve(leaves: &[Leaf], matches: &[PatternId]) -> Result<Option<LeafId>, GraphError> {
    let priority_of = |id: PatternId| leaves[id as usize].priority;
    let Some(priority) = matches.iter().map(|&id| priority_of(id)).max() else {
        return Ok(None);
    };

    let top: Vec<LeafId> = matches
        .iter()
        .copied()
        .filter(|&id| priority_of(id) == priority)
        .collect();
    if let [leaf] = top[..] {
        return Ok(Some(leaf));
    }
    Err(GraphError::MultipleLeavesWithSamePriority {
        leaves: top,
        priority,
    })
}
