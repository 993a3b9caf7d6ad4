//! Priority-resolved lexer state graph.
//!
//! The graph is built from a DFA and the leaves it was compiled from. Every
//! state knows which leaf (if any) it accepts, which leaf it commits to
//! early, and its outgoing edges grouped by target. State ids are dense,
//! with the root at 0, and are reissued by every optimization round.

mod build;
mod dump;
mod optimize;

#[cfg(test)]
mod dump_tests;

use std::fmt;

use lexforge_automata::dfa::Dfa;
use lexforge_automata::hir::{ByteSet, ClassRange};
use serde::{Serialize, Serializer};

use crate::leaf::{Leaf, LeafId};

/// Index into the graph's states.
pub type State = u32;

/// Set of bytes labelling an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ByteClass(ByteSet);

impl ByteClass {
    pub fn new(bytes: ByteSet) -> Self {
        Self(bytes)
    }

    pub fn from_range(start: u8, end: u8) -> Self {
        Self(ByteSet::new([ClassRange::new(start, end)]))
    }

    pub fn bytes(&self) -> &ByteSet {
        &self.0
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.0.contains(byte)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn union(&mut self, other: &ByteClass) {
        self.0.union(&other.0);
    }

    /// Smallest byte in the class.
    pub fn first(&self) -> Option<u8> {
        self.0.ranges().first().map(|r| r.start())
    }
}

/// Printable ASCII as itself, everything else as `\xHH`.
impl fmt::Display for ByteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write_byte(f, range.start())?;
            if range.end() != range.start() {
                f.write_str("-")?;
                write_byte(f, range.end())?;
            }
        }
        Ok(())
    }
}

fn write_byte(f: &mut fmt::Formatter<'_>, byte: u8) -> fmt::Result {
    match byte {
        b'\\' => f.write_str("\\\\"),
        b'-' => f.write_str("\\-"),
        b' ' => f.write_str("\\x20"),
        b'!'..=b'~' => write!(f, "{}", byte as char),
        _ => write!(f, "\\x{byte:02X}"),
    }
}

/// Serialized as a list of inclusive `[start, end]` pairs.
impl Serialize for ByteClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|r| [r.start(), r.end()]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct StateType {
    /// Leaf matched when input ends or cannot continue here.
    pub accept: Option<LeafId>,
    /// Leaf the match is committed to on entering this state: no further
    /// input can change it.
    pub early: Option<LeafId>,
}

impl StateType {
    /// Leaf this state stands for, early taking precedence.
    pub fn leaf(&self) -> Option<LeafId> {
        self.early.or(self.accept)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct StateData {
    pub state_type: StateType,
    /// Outgoing edges sorted by target; byte classes are disjoint.
    pub normal: Vec<(ByteClass, State)>,
    /// Predecessors, sorted and deduplicated.
    pub back_edges: Vec<State>,
}

impl StateData {
    /// True when some byte has no outgoing edge.
    pub fn can_error(&self) -> bool {
        self.normal.iter().map(|(class, _)| class.len()).sum::<usize>() < 256
    }

    pub fn next(&self, byte: u8) -> Option<State> {
        self.normal
            .iter()
            .find(|(class, _)| class.contains(byte))
            .map(|&(_, target)| target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
pub enum GraphError {
    /// Leaves matching in the same state share the highest priority.
    #[error("leaves {leaves:?} match the same input with equal priority {priority}")]
    MultipleLeavesWithSamePriority { leaves: Vec<LeafId>, priority: u32 },
}

#[derive(Debug, Clone, Serialize)]
pub struct Graph {
    leaves: Vec<Leaf>,
    #[serde(skip)]
    dfa: Dfa,
    states: Vec<StateData>,
    root: State,
    errors: Vec<GraphError>,
}

impl Graph {
    /// State ids, `0..count`.
    pub fn states(&self) -> std::ops::Range<State> {
        0..self.states.len() as State
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get_state_data(&self, state: State) -> &StateData {
        &self.states[state as usize]
    }

    pub fn root(&self) -> State {
        self.root
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn get_leaf(&self, id: LeafId) -> &Leaf {
        &self.leaves[id as usize]
    }

    pub fn errors(&self) -> &[GraphError] {
        &self.errors
    }

    /// DFA the graph was built from.
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    pub fn can_error(&self, state: State) -> bool {
        self.get_state_data(state).can_error()
    }

    /// Longest-match interpretation of the graph over `input`: length of
    /// the token at the start of `input` and the leaf producing it.
    ///
    /// Entering an early state commits to its leaf for the rest of `input`.
    pub fn longest_match(&self, input: &[u8]) -> Option<(usize, LeafId)> {
        let mut state = self.root;
        let root = self.get_state_data(state).state_type;
        if let Some(leaf) = root.early {
            return Some((input.len(), leaf));
        }
        let mut last = root.accept.map(|leaf| (0, leaf));

        for (i, &byte) in input.iter().enumerate() {
            let Some(next) = self.get_state_data(state).next(byte) else {
                break;
            };
            state = next;
            let state_type = self.get_state_data(state).state_type;
            if let Some(leaf) = state_type.early {
                return Some((input.len(), leaf));
            }
            if let Some(leaf) = state_type.accept {
                last = Some((i + 1, leaf));
            }
        }
        last
    }
}
