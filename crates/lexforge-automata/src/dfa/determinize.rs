//! Powerset construction.
//!
//! A DFA state stands for the set of consuming and match NFA states active
//! after some input. Unions are followed during closure and never appear in
//! a set, so sets differing only in bookkeeping states coincide.

use std::collections::{HashMap, VecDeque};

use indexmap::IndexSet;

use super::{ByteClasses, Config, DEAD, Dfa, DfaState, DfaStateId};
use crate::DfaConversionError;
use crate::nfa::{Nfa, PatternId, State, StateId};

#[derive(Debug, Clone, Default)]
pub struct Determinizer {
    config: Config,
}

impl Determinizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn build(&self, nfa: &Nfa) -> Result<Dfa, DfaConversionError> {
        let classes = if self.config.byte_classes {
            ByteClasses::from_nfa(nfa)
        } else {
            ByteClasses::singletons()
        };
        log::trace!("byte classes: {:?}", classes);

        let mut run = Run::new(nfa, &self.config);
        let mut start_set = Vec::new();
        run.closure(nfa.start(), &mut start_set);
        let start = run.intern(start_set)?;

        let representatives: Vec<u8> = classes.representatives().collect();
        let mut targets = vec![DEAD; representatives.len()];
        let mut next_set = Vec::new();
        while let Some(id) = run.queue.pop_front() {
            let set = run.sets[id as usize].clone();
            for (class, &byte) in representatives.iter().enumerate() {
                next_set.clear();
                for &nfa_id in set.iter() {
                    if let Some(next) = step(nfa.state(nfa_id), byte) {
                        run.closure(next, &mut next_set);
                    }
                }
                targets[class] = run.intern(std::mem::take(&mut next_set))?;
            }

            let transitions = &mut run.states[id as usize].transitions;
            for byte in 0..=u8::MAX {
                transitions[byte as usize] = targets[classes.get(byte) as usize];
            }
        }

        let dfa = run.finish(start, classes);
        log::debug!(
            "dfa: {} states, {} byte classes, {} patterns matched",
            dfa.len(),
            dfa.byte_classes().alphabet_len(),
            dfa.pattern_ids().len()
        );
        Ok(dfa)
    }
}

/// Target of a consuming state on `byte`.
fn step(state: &State, byte: u8) -> Option<StateId> {
    match state {
        State::ByteRange { trans } if trans.matches(byte) => Some(trans.next),
        State::Sparse { transitions } => transitions
            .iter()
            .find(|t| t.matches(byte))
            .map(|t| t.next),
        _ => None,
    }
}

/// Working state of one `Determinizer::build` call.
struct Run<'a> {
    nfa: &'a Nfa,
    state_limit: usize,
    states: Vec<DfaState>,
    /// NFA set behind each DFA state, sorted.
    sets: Vec<Box<[StateId]>>,
    cache: HashMap<Box<[StateId]>, DfaStateId>,
    queue: VecDeque<DfaStateId>,
    pattern_ids: IndexSet<PatternId>,
    /// Closure visit marks, reset on every `intern`.
    seen: Vec<bool>,
    marked: Vec<StateId>,
    stack: Vec<StateId>,
}

impl<'a> Run<'a> {
    fn new(nfa: &'a Nfa, config: &Config) -> Self {
        let mut run = Self {
            nfa,
            state_limit: config.state_limit.min(DfaStateId::MAX as usize),
            states: vec![DfaState::dead()],
            sets: vec![Box::default()],
            cache: HashMap::new(),
            queue: VecDeque::new(),
            pattern_ids: IndexSet::new(),
            seen: vec![false; nfa.len()],
            marked: Vec::new(),
            stack: Vec::new(),
        };
        run.cache.insert(Box::default(), DEAD);
        run
    }

    /// Add the consuming and match states reachable from `start` without
    /// consuming input. States already visited since the last `intern` are
    /// skipped.
    fn closure(&mut self, start: StateId, set: &mut Vec<StateId>) {
        self.stack.push(start);
        while let Some(id) = self.stack.pop() {
            if std::mem::replace(&mut self.seen[id as usize], true) {
                continue;
            }
            self.marked.push(id);
            match self.nfa.state(id) {
                State::Union { alternates } => self.stack.extend(alternates.iter().rev()),
                State::BinaryUnion { alt1, alt2 } => {
                    self.stack.push(*alt2);
                    self.stack.push(*alt1);
                }
                State::ByteRange { .. } | State::Sparse { .. } | State::Match { .. } => {
                    set.push(id)
                }
                State::Fail => {}
            }
        }
    }

    fn intern(&mut self, mut set: Vec<StateId>) -> Result<DfaStateId, DfaConversionError> {
        for id in self.marked.drain(..) {
            self.seen[id as usize] = false;
        }
        set.sort_unstable();
        set.dedup();
        let set = set.into_boxed_slice();
        if let Some(&id) = self.cache.get(&set) {
            return Ok(id);
        }

        if self.states.len() >= self.state_limit {
            return Err(DfaConversionError::StateLimitExceeded {
                limit: self.state_limit,
            });
        }
        let id = self.states.len() as DfaStateId;

        let mut matches: Vec<PatternId> = set
            .iter()
            .filter_map(|&nfa_id| match self.nfa.state(nfa_id) {
                State::Match { pattern_id } => Some(*pattern_id),
                _ => None,
            })
            .collect();
        matches.sort_unstable();
        matches.dedup();
        self.pattern_ids.extend(matches.iter().copied());

        self.states.push(DfaState {
            transitions: Box::new([DEAD; 256]),
            matches,
        });
        self.sets.push(set.clone());
        self.cache.insert(set, id);
        self.queue.push_back(id);
        Ok(id)
    }

    /// Drop states unreachable from `start` and compact ids, dead first.
    fn finish(self, start: DfaStateId, byte_classes: ByteClasses) -> Dfa {
        let mut remap: Vec<Option<DfaStateId>> = vec![None; self.states.len()];
        remap[DEAD as usize] = Some(DEAD);
        let mut order = vec![DEAD];
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            if remap[id as usize].is_some() {
                continue;
            }
            remap[id as usize] = Some(order.len() as DfaStateId);
            order.push(id);
            for &next in self.states[id as usize].transitions.iter() {
                if remap[next as usize].is_none() {
                    queue.push_back(next);
                }
            }
        }

        let pruned = self.states.len() - order.len();
        if pruned > 0 {
            log::trace!("dfa: pruned {pruned} unreachable states");
        }

        let mut states = self.states;
        let states: Vec<DfaState> = order
            .iter()
            .map(|&old| {
                let mut state = std::mem::replace(&mut states[old as usize], DfaState::dead());
                for target in state.transitions.iter_mut() {
                    *target = remap[*target as usize].unwrap_or(DEAD);
                }
                state
            })
            .collect();

        Dfa {
            states,
            start: remap[start as usize].unwrap_or(DEAD),
            pattern_ids: self.pattern_ids.into_iter().collect(),
            byte_classes,
        }
    }
}
