//! Byte-level DFA and powerset construction.
//!
//! State 0 is always the dead state: it loops to itself on every byte and
//! never matches. Every transition of every state is a valid id.

mod byte_classes;
mod determinize;

#[cfg(test)]
mod byte_classes_tests;
#[cfg(test)]
mod determinize_tests;

use std::fmt;

pub use byte_classes::ByteClasses;
pub use determinize::Determinizer;

use crate::nfa::PatternId;

/// Index into `Dfa::states`.
pub type DfaStateId = u32;

/// The dead sink state.
pub const DEAD: DfaStateId = 0;

pub const DEFAULT_STATE_LIMIT: usize = u32::MAX as usize;

/// Determinization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub state_limit: usize,
    /// Simulate one byte per equivalence class instead of all 256.
    pub byte_classes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_limit: DEFAULT_STATE_LIMIT,
            byte_classes: true,
        }
    }
}

impl Config {
    pub fn with_state_limit(mut self, limit: usize) -> Self {
        self.state_limit = limit;
        self
    }

    pub fn with_byte_classes(mut self, yes: bool) -> Self {
        self.byte_classes = yes;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    transitions: Box<[DfaStateId; 256]>,
    /// Sorted; non-empty for match states.
    matches: Vec<PatternId>,
}

impl DfaState {
    fn dead() -> Self {
        Self {
            transitions: Box::new([DEAD; 256]),
            matches: Vec::new(),
        }
    }

    pub fn next(&self, byte: u8) -> DfaStateId {
        self.transitions[byte as usize]
    }

    pub fn transitions(&self) -> &[DfaStateId; 256] {
        &self.transitions
    }

    pub fn matches(&self) -> &[PatternId] {
        &self.matches
    }

    pub fn is_match(&self) -> bool {
        !self.matches.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    states: Vec<DfaState>,
    start: DfaStateId,
    /// Every pattern matched somewhere, in first-seen order.
    pattern_ids: Vec<PatternId>,
    byte_classes: ByteClasses,
}

impl Dfa {
    /// Initial state. Equal to `DEAD` when no pattern can match anything.
    pub fn start(&self) -> DfaStateId {
        self.start
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn state(&self, id: DfaStateId) -> &DfaState {
        &self.states[id as usize]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn next_state(&self, id: DfaStateId, byte: u8) -> DfaStateId {
        self.state(id).next(byte)
    }

    pub fn pattern_ids(&self) -> &[PatternId] {
        &self.pattern_ids
    }

    pub fn is_dead(&self, id: DfaStateId) -> bool {
        id == DEAD
    }

    pub fn is_match(&self, id: DfaStateId) -> bool {
        self.state(id).is_match()
    }

    /// Classes used during construction.
    pub fn byte_classes(&self) -> &ByteClasses {
        &self.byte_classes
    }

    /// Longest prefix of `input` that some pattern matches, with the
    /// patterns matching it.
    pub fn find_longest(&self, input: &[u8]) -> Option<(usize, &[PatternId])> {
        let mut id = self.start;
        let mut last = self.is_match(id).then_some((0, id));
        for (i, &byte) in input.iter().enumerate() {
            id = self.next_state(id, byte);
            if self.is_dead(id) {
                break;
            }
            if self.is_match(id) {
                last = Some((i + 1, id));
            }
        }
        last.map(|(len, id)| (len, self.state(id).matches()))
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, state) in self.states.iter().enumerate() {
            let id = id as DfaStateId;
            let marker = if id == self.start { '^' } else { ' ' };
            write!(f, "{marker}{id:02}:")?;
            if self.is_dead(id) {
                writeln!(f, " dead")?;
                continue;
            }

            let mut first = true;
            for (start, end, target) in runs(&state.transitions) {
                if target == DEAD {
                    continue;
                }
                f.write_str(if first { " " } else { ", " })?;
                first = false;
                if start == end {
                    write!(f, "{start:02X} => {target}")?;
                } else {
                    write!(f, "{start:02X}-{end:02X} => {target}")?;
                }
            }
            if state.is_match() {
                let ids: Vec<String> = state.matches.iter().map(ToString::to_string).collect();
                write!(f, " match({})", ids.join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Maximal runs of consecutive bytes with the same target.
fn runs(transitions: &[DfaStateId; 256]) -> Vec<(u8, u8, DfaStateId)> {
    let mut out: Vec<(u8, u8, DfaStateId)> = Vec::new();
    for (byte, &target) in (0..=u8::MAX).zip(transitions.iter()) {
        match out.last_mut() {
            Some((_, end, last)) if *last == target => *end = byte,
            _ => out.push((byte, byte, target)),
        }
    }
    out
}
