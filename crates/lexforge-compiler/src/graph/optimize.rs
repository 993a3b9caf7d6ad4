//! Graph optimization rounds.
//!
//! Each round hoists early accepts, drops accepts no lexer can observe,
//! prunes dead states, merges identical states and renumbers from the root.
//! Rounds repeat until one leaves the graph unchanged.

use std::collections::{HashMap, VecDeque};

use super::{ByteClass, Graph, State, StateData, StateType};
use crate::leaf::LeafId;

impl Graph {
    /// Run optimization rounds to a fixpoint. Idempotent.
    pub fn optimize(&mut self) {
        let initial = self.states.len();
        let mut rounds = 0;
        loop {
            rounds += 1;
            let before = (self.states.clone(), self.root);

            self.hoist_early();
            self.drop_shadowed_accepts();
            self.prune();
            self.dedup();
            self.renumber();

            log::trace!("optimize round {rounds}: {} states", self.states.len());
            if self.states == before.0 && self.root == before.1 {
                break;
            }
        }
        log::debug!(
            "optimize: {initial} -> {} states in {rounds} rounds",
            self.states.len()
        );
    }

    /// Mark `early` on every state that cannot error and whose successors
    /// all carry the same leaf and qualify themselves (greatest fixpoint).
    fn hoist_early(&mut self) {
        let mut candidate: Vec<Option<LeafId>> = self
            .states
            .iter()
            .map(|data| {
                if data.can_error() {
                    None
                } else {
                    data.state_type.leaf()
                }
            })
            .collect();

        let mut changed = true;
        while changed {
            changed = false;
            for (id, data) in self.states.iter().enumerate() {
                let Some(leaf) = candidate[id] else {
                    continue;
                };
                let closed = data
                    .normal
                    .iter()
                    .all(|&(_, target)| candidate[target as usize] == Some(leaf));
                if !closed {
                    candidate[id] = None;
                    changed = true;
                }
            }
        }

        for (data, leaf) in self.states.iter_mut().zip(candidate) {
            if data.state_type.early.is_none() {
                data.state_type.early = leaf;
            }
        }
    }

    /// Accept is unobservable when every way in passes through an early
    /// state committed to the same leaf.
    fn drop_shadowed_accepts(&mut self) {
        let mut shadowed = Vec::new();
        for (id, data) in self.states.iter().enumerate() {
            let Some(accept) = data.state_type.accept else {
                continue;
            };
            if id as State == self.root || data.back_edges.is_empty() {
                continue;
            }
            let all_early = data
                .back_edges
                .iter()
                .all(|&pred| self.states[pred as usize].state_type.early == Some(accept));
            if all_early {
                shadowed.push(id);
            }
        }
        for id in shadowed {
            self.states[id].state_type.accept = None;
        }
    }

    /// Drop states unreachable from the root and states that reach no leaf.
    /// The root always survives.
    fn prune(&mut self) {
        let count = self.states.len();

        let mut forward = vec![false; count];
        forward[self.root as usize] = true;
        let mut queue = VecDeque::from([self.root]);
        while let Some(id) = queue.pop_front() {
            for &(_, target) in &self.states[id as usize].normal {
                if !forward[target as usize] {
                    forward[target as usize] = true;
                    queue.push_back(target);
                }
            }
        }

        let mut productive = vec![false; count];
        for (id, data) in self.states.iter().enumerate() {
            if data.state_type.leaf().is_some() {
                productive[id] = true;
                queue.push_back(id as State);
            }
        }
        while let Some(id) = queue.pop_front() {
            for &pred in &self.states[id as usize].back_edges {
                if !productive[pred as usize] {
                    productive[pred as usize] = true;
                    queue.push_back(pred);
                }
            }
        }

        let keep: Vec<bool> = (0..count)
            .map(|id| id as State == self.root || (forward[id] && productive[id]))
            .collect();
        if keep.iter().all(|&k| k) {
            return;
        }

        let mut remap = vec![None; count];
        let mut next = 0;
        for (id, &k) in keep.iter().enumerate() {
            if k {
                remap[id] = Some(next);
                next += 1;
            }
        }
        self.retain_mapped(&remap);
    }

    /// Merge states with identical type and edges.
    fn dedup(&mut self) {
        let mut representative: HashMap<(StateType, Vec<(ByteClass, State)>), State> =
            HashMap::new();
        let mut remap = vec![None; self.states.len()];
        let mut merged = vec![0; self.states.len()];
        let mut unique = 0;
        for (id, data) in self.states.iter().enumerate() {
            let key = (data.state_type, data.normal.clone());
            let target = *representative.entry(key).or_insert_with(|| {
                remap[id] = Some(unique);
                unique += 1;
                unique - 1
            });
            merged[id] = target;
        }
        if unique as usize == self.states.len() {
            return;
        }

        self.states = std::mem::take(&mut self.states)
            .into_iter()
            .zip(&remap)
            .filter(|(_, slot)| slot.is_some())
            .map(|(mut data, _)| {
                data.normal = merge_edges(data.normal, |target| merged[target as usize]);
                data
            })
            .collect();
        self.root = merged[self.root as usize];
        self.recompute_back_edges();
    }

    /// Renumber in BFS order from the root, visiting edges by lowest byte.
    fn renumber(&mut self) {
        let mut order = vec![self.root];
        let mut remap = vec![None; self.states.len()];
        remap[self.root as usize] = Some(0);
        let mut queue = VecDeque::from([self.root]);
        while let Some(id) = queue.pop_front() {
            let mut targets: Vec<(Option<u8>, State)> = self.states[id as usize]
                .normal
                .iter()
                .map(|(class, target)| (class.first(), *target))
                .collect();
            targets.sort_unstable();
            for (_, target) in targets {
                if remap[target as usize].is_none() {
                    remap[target as usize] = Some(order.len() as State);
                    order.push(target);
                    queue.push_back(target);
                }
            }
        }

        let mut slots: Vec<Option<StateData>> =
            std::mem::take(&mut self.states).into_iter().map(Some).collect();
        self.states = order
            .iter()
            .filter_map(|&old| slots[old as usize].take())
            .map(|mut data| {
                data.normal = merge_edges(data.normal, |target| {
                    remap[target as usize].expect("edge into an unvisited state")
                });
                data
            })
            .collect();
        self.root = 0;
        self.recompute_back_edges();
    }

    /// Keep states with a slot in `remap` and rewrite edges; edges into
    /// dropped states disappear.
    fn retain_mapped(&mut self, remap: &[Option<State>]) {
        self.states = std::mem::take(&mut self.states)
            .into_iter()
            .zip(remap)
            .filter(|(_, slot)| slot.is_some())
            .map(|(mut data, _)| {
                data.normal = data
                    .normal
                    .into_iter()
                    .filter_map(|(class, target)| Some((class, remap[target as usize]?)))
                    .collect();
                data.normal.sort_by_key(|&(_, target)| target);
                data
            })
            .collect();
        self.root = remap[self.root as usize].unwrap_or(0);
        self.recompute_back_edges();
    }

    pub(super) fn recompute_back_edges(&mut self) {
        let mut back: Vec<Vec<State>> = vec![Vec::new(); self.states.len()];
        for (id, data) in self.states.iter().enumerate() {
            for &(_, target) in &data.normal {
                back[target as usize].push(id as State);
            }
        }
        for (data, mut preds) in self.states.iter_mut().zip(back) {
            preds.sort_unstable();
            preds.dedup();
            data.back_edges = preds;
        }
    }
}

/// Rewrite targets, then union classes sharing a target. Sorted by target.
fn merge_edges(
    normal: Vec<(ByteClass, State)>,
    rewrite: impl Fn(State) -> State,
) -> Vec<(ByteClass, State)> {
    let mut out: Vec<(ByteClass, State)> = Vec::with_capacity(normal.len());
    for (class, target) in normal {
        let target = rewrite(target);
        match out.iter_mut().find(|(_, t)| *t == target) {
            Some((existing, _)) => existing.union(&class),
            None => out.push((class, target)),
        }
    }
    out.sort_by_key(|&(_, target)| target);
    out
}
