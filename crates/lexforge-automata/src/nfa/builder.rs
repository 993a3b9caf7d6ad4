//! Arena for NFA construction with patchable placeholder states.
//!
//! States are added before their successors are known and wired later with
//! `patch`. `build` chases `Empty` and single-branch unions to the state they
//! stand for, so none of them survive into the `Nfa`.

use std::collections::{HashMap, VecDeque};

use super::{Nfa, PatternId, State, StateId, Transition, DEFAULT_STATE_LIMIT};
use crate::NfaConstructionError;

#[derive(Debug, Clone)]
enum BuilderState {
    /// Epsilon placeholder. Unpatched placeholders match nothing.
    Empty { next: Option<StateId> },
    ByteRange { trans: Transition },
    Sparse { transitions: Vec<Transition> },
    /// Alternates in priority order.
    Union { alternates: Vec<StateId> },
    /// Alternates in reverse priority order (reluctant repetition).
    UnionReverse { alternates: Vec<StateId> },
    Match { pattern_id: PatternId },
    Fail,
}

#[derive(Debug, Clone)]
pub struct Builder {
    states: Vec<BuilderState>,
    state_limit: usize,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            state_limit: DEFAULT_STATE_LIMIT,
        }
    }

    pub fn with_state_limit(mut self, limit: usize) -> Self {
        self.state_limit = limit;
        self
    }

    /// Number of states added so far.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn add_empty(&mut self) -> Result<StateId, NfaConstructionError> {
        self.add(BuilderState::Empty { next: None })
    }

    /// Union trying `alternates` in order. More can be appended by `patch`.
    pub fn add_union(&mut self, alternates: Vec<StateId>) -> Result<StateId, NfaConstructionError> {
        self.add(BuilderState::Union { alternates })
    }

    /// Union whose alternates (including patched ones) are tried last-first.
    pub fn add_union_reverse(
        &mut self,
        alternates: Vec<StateId>,
    ) -> Result<StateId, NfaConstructionError> {
        self.add(BuilderState::UnionReverse { alternates })
    }

    pub fn add_range(&mut self, trans: Transition) -> Result<StateId, NfaConstructionError> {
        self.add(BuilderState::ByteRange { trans })
    }

    /// Multi-way byte dispatch. Transitions must be sorted and non-overlapping.
    pub fn add_sparse(
        &mut self,
        transitions: Vec<Transition>,
    ) -> Result<StateId, NfaConstructionError> {
        match transitions.len() {
            0 => Err(NfaConstructionError::InvalidOperation("empty sparse state")),
            1 => self.add_range(transitions[0]),
            _ => self.add(BuilderState::Sparse { transitions }),
        }
    }

    pub fn add_match(&mut self, pattern_id: PatternId) -> Result<StateId, NfaConstructionError> {
        self.add(BuilderState::Match { pattern_id })
    }

    pub fn add_fail(&mut self) -> Result<StateId, NfaConstructionError> {
        self.add(BuilderState::Fail)
    }

    /// Point `from` at `to`: set the successor of an empty or byte-range
    /// state, or append an alternate to a union.
    pub fn patch(&mut self, from: StateId, to: StateId) -> Result<(), NfaConstructionError> {
        if to as usize >= self.states.len() {
            return Err(NfaConstructionError::InvalidOperation("patch to unknown state"));
        }
        let Some(state) = self.states.get_mut(from as usize) else {
            return Err(NfaConstructionError::InvalidOperation("patch from unknown state"));
        };
        match state {
            BuilderState::Empty { next } => *next = Some(to),
            BuilderState::ByteRange { trans } => trans.next = to,
            BuilderState::Union { alternates } | BuilderState::UnionReverse { alternates } => {
                alternates.push(to)
            }
            BuilderState::Sparse { .. } => {
                return Err(NfaConstructionError::InvalidOperation(
                    "sparse states cannot be patched",
                ));
            }
            BuilderState::Match { .. } | BuilderState::Fail => {
                return Err(NfaConstructionError::InvalidOperation(
                    "terminal states cannot be patched",
                ));
            }
        }
        Ok(())
    }

    /// Finish construction from `start`.
    ///
    /// Only states reachable from `start` are kept, numbered in breadth-first
    /// order so the start state is 0.
    pub fn build(self, start: StateId, pattern_len: usize) -> Result<Nfa, NfaConstructionError> {
        if start as usize >= self.states.len() {
            return Err(NfaConstructionError::InvalidOperation("start state out of range"));
        }
        if self.states.iter().any(|state| self.has_dangling_target(state)) {
            return Err(NfaConstructionError::InvalidOperation("transition to unknown state"));
        }
        let mut finisher = Finisher::new(&self);
        let start = finisher.id_of(start);
        while let Some(old) = finisher.queue.pop_front() {
            let state = finisher.finish(old);
            let id = finisher.remap[&old];
            finisher.states[id as usize] = state;
        }

        Ok(Nfa {
            states: finisher.states,
            start,
            pattern_len,
        })
    }

    fn add(&mut self, state: BuilderState) -> Result<StateId, NfaConstructionError> {
        let id = self.states.len();
        if id >= self.state_limit {
            return Err(NfaConstructionError::StateLimitExceeded {
                limit: self.state_limit,
            });
        }
        let id = StateId::try_from(id).map_err(|_| NfaConstructionError::StateLimitExceeded {
            limit: self.state_limit,
        })?;
        self.states.push(state);
        Ok(id)
    }

    /// True when `state` points past the arena. Targets passed to the `add_*`
    /// constructors are not checked until `build`.
    fn has_dangling_target(&self, state: &BuilderState) -> bool {
        let unknown = |id: StateId| id as usize >= self.states.len();
        match state {
            BuilderState::Empty { next } => next.is_some_and(unknown),
            BuilderState::ByteRange { trans } => unknown(trans.next),
            BuilderState::Sparse { transitions } => transitions.iter().any(|t| unknown(t.next)),
            BuilderState::Union { alternates } | BuilderState::UnionReverse { alternates } => {
                alternates.iter().copied().any(unknown)
            }
            BuilderState::Match { .. } | BuilderState::Fail => false,
        }
    }

    /// Follow epsilon placeholders to the state they stand for.
    ///
    /// Returns `None` on a cycle made only of placeholders.
    fn resolve(&self, mut id: StateId) -> Option<StateId> {
        for _ in 0..=self.states.len() {
            match &self.states[id as usize] {
                BuilderState::Empty { next: Some(next) } => id = *next,
                BuilderState::Union { alternates } | BuilderState::UnionReverse { alternates }
                    if alternates.len() == 1 =>
                {
                    id = alternates[0]
                }
                _ => return Some(id),
            }
        }
        None
    }

    fn matches_nothing(&self, id: StateId) -> bool {
        match &self.states[id as usize] {
            BuilderState::Fail | BuilderState::Empty { next: None } => true,
            BuilderState::Union { alternates } | BuilderState::UnionReverse { alternates } => {
                alternates.is_empty()
            }
            _ => false,
        }
    }
}

/// Renumbering pass behind `Builder::build`.
struct Finisher<'b> {
    builder: &'b Builder,
    /// Resolved builder id to final id.
    remap: HashMap<StateId, StateId>,
    queue: VecDeque<StateId>,
    states: Vec<State>,
    /// Shared target for everything that matches nothing.
    fail: Option<StateId>,
}

impl<'b> Finisher<'b> {
    fn new(builder: &'b Builder) -> Self {
        Self {
            builder,
            remap: HashMap::new(),
            queue: VecDeque::new(),
            states: Vec::new(),
            fail: None,
        }
    }

    /// Final id for a builder state, allocating a slot on first sight.
    fn id_of(&mut self, old: StateId) -> StateId {
        let resolved = self
            .builder
            .resolve(old)
            .filter(|&id| !self.builder.matches_nothing(id));

        let Some(resolved) = resolved else {
            if let Some(fail) = self.fail {
                return fail;
            }
            let fail = self.states.len() as StateId;
            self.states.push(State::Fail);
            self.fail = Some(fail);
            return fail;
        };

        if let Some(&id) = self.remap.get(&resolved) {
            return id;
        }
        let id = self.states.len() as StateId;
        // Overwritten once the slot is dequeued.
        self.states.push(State::Fail);
        self.remap.insert(resolved, id);
        self.queue.push_back(resolved);
        id
    }

    fn finish(&mut self, old: StateId) -> State {
        let builder = self.builder;
        match &builder.states[old as usize] {
            BuilderState::ByteRange { trans } => State::ByteRange {
                trans: Transition::new(trans.start, trans.end, self.id_of(trans.next)),
            },
            BuilderState::Sparse { transitions } => {
                let transitions = transitions
                    .iter()
                    .map(|t| Transition::new(t.start, t.end, self.id_of(t.next)))
                    .collect();
                State::Sparse { transitions }
            }
            BuilderState::Union { alternates } => self.union(alternates.iter().copied()),
            BuilderState::UnionReverse { alternates } => {
                self.union(alternates.iter().rev().copied())
            }
            BuilderState::Match { pattern_id } => State::Match {
                pattern_id: *pattern_id,
            },
            BuilderState::Empty { .. } | BuilderState::Fail => State::Fail,
        }
    }

    fn union(&mut self, alternates: impl Iterator<Item = StateId>) -> State {
        let alts: Vec<StateId> = alternates.map(|alt| self.id_of(alt)).collect();
        if let [alt1, alt2] = alts[..] {
            return State::BinaryUnion { alt1, alt2 };
        }
        State::Union {
            alternates: alts.into_boxed_slice(),
        }
    }
}
