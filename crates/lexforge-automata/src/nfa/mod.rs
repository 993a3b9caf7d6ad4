//! Byte-oriented Thompson NFA.
//!
//! `Builder` is an arena with forward-reference placeholders; `Compiler`
//! drives it from `HirKind` values. The finished `Nfa` is epsilon-free:
//! the only non-consuming states left are unions of two or more branches.

mod builder;
mod compiler;

#[cfg(test)]
mod compiler_tests;

use std::fmt;

pub use builder::Builder;
pub use compiler::Compiler;

/// Index into `Nfa::states`.
pub type StateId = u32;

/// Index of an input pattern, in compilation order.
pub type PatternId = u32;

pub const DEFAULT_STATE_LIMIT: usize = u32::MAX as usize;
pub const DEFAULT_PATTERN_LIMIT: usize = u32::MAX as usize;
pub const DEFAULT_SUFFIX_CACHE_CAPACITY: usize = 10_000;

/// NFA construction limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub state_limit: usize,
    pub pattern_limit: usize,
    /// Entries kept in the UTF-8 suffix cache before it is cleared.
    pub suffix_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_limit: DEFAULT_STATE_LIMIT,
            pattern_limit: DEFAULT_PATTERN_LIMIT,
            suffix_cache_capacity: DEFAULT_SUFFIX_CACHE_CAPACITY,
        }
    }
}

impl Config {
    pub fn with_state_limit(mut self, limit: usize) -> Self {
        self.state_limit = limit;
        self
    }

    pub fn with_pattern_limit(mut self, limit: usize) -> Self {
        self.pattern_limit = limit;
        self
    }

    pub fn with_suffix_cache_capacity(mut self, capacity: usize) -> Self {
        self.suffix_cache_capacity = capacity;
        self
    }
}

/// Consume one byte in `start..=end` and move to `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    pub start: u8,
    pub end: u8,
    pub next: StateId,
}

impl Transition {
    pub fn new(start: u8, end: u8, next: StateId) -> Self {
        Self { start, end, next }
    }

    pub fn matches(&self, byte: u8) -> bool {
        self.start <= byte && byte <= self.end
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{:02X} => {}", self.start, self.next)
        } else {
            write!(f, "{:02X}-{:02X} => {}", self.start, self.end, self.next)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    ByteRange { trans: Transition },
    /// Sorted, non-overlapping transitions; at most one applies per byte.
    Sparse { transitions: Box<[Transition]> },
    /// Epsilon fan-out; earlier alternates have priority.
    Union { alternates: Box<[StateId]> },
    BinaryUnion { alt1: StateId, alt2: StateId },
    Match { pattern_id: PatternId },
    Fail,
}

impl State {
    /// True for states followed without consuming input.
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Self::Union { .. } | Self::BinaryUnion { .. })
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByteRange { trans } => write!(f, "{trans}"),
            Self::Sparse { transitions } => {
                f.write_str("sparse(")?;
                for (i, trans) in transitions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{trans}")?;
                }
                f.write_str(")")
            }
            Self::Union { alternates } => {
                f.write_str("union(")?;
                for (i, alt) in alternates.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{alt}")?;
                }
                f.write_str(")")
            }
            Self::BinaryUnion { alt1, alt2 } => write!(f, "binary-union({alt1}, {alt2})"),
            Self::Match { pattern_id } => write!(f, "match({pattern_id})"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

/// Multi-pattern NFA with a single start state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
    pattern_len: usize,
}

impl Nfa {
    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id as usize]
    }

    /// Number of patterns compiled into this NFA.
    pub fn pattern_len(&self) -> usize {
        self.pattern_len
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, state) in self.states.iter().enumerate() {
            let marker = if id as StateId == self.start { '^' } else { ' ' };
            writeln!(f, "{marker}{id:02}: {state}")?;
        }
        Ok(())
    }
}
