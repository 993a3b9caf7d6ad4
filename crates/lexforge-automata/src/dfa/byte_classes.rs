//! Byte equivalence classes.
//!
//! Two bytes share a class when no NFA transition distinguishes them, so
//! determinization only has to simulate one representative per class.

use std::fmt;

use crate::hir::{ByteSet, ClassRange};
use crate::nfa::{Nfa, State};

/// Map from byte to class id. Class ids are dense and ascend with the bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ByteClasses([u8; 256]);

impl ByteClasses {
    /// Every byte in its own class.
    pub fn singletons() -> Self {
        let mut classes = [0; 256];
        for (byte, class) in (0..=u8::MAX).zip(classes.iter_mut()) {
            *class = byte;
        }
        Self(classes)
    }

    /// Coarsest classes that respect every transition range of `nfa`.
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let mut boundaries = BoundarySet::new();
        for state in nfa.states() {
            match state {
                State::ByteRange { trans } => boundaries.add(trans.start, trans.end),
                State::Sparse { transitions } => {
                    for trans in transitions.iter() {
                        boundaries.add(trans.start, trans.end);
                    }
                }
                State::Union { .. }
                | State::BinaryUnion { .. }
                | State::Match { .. }
                | State::Fail => {}
            }
        }
        boundaries.classes()
    }

    pub fn get(&self, byte: u8) -> u8 {
        self.0[byte as usize]
    }

    /// Number of classes.
    pub fn alphabet_len(&self) -> usize {
        self.0[255] as usize + 1
    }

    pub fn is_singleton(&self) -> bool {
        self.alphabet_len() == 256
    }

    /// Smallest byte of each class, in class order.
    pub fn representatives(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|&b| b == 0 || self.get(b) != self.get(b - 1))
    }

    /// Bytes belonging to `class`.
    pub fn elements(&self, class: u8) -> ByteSet {
        (0..=u8::MAX)
            .filter(|&b| self.get(b) == class)
            .map(ClassRange::single)
            .collect()
    }
}

impl fmt::Debug for ByteClasses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_singleton() {
            return f.write_str("ByteClasses(<one class per byte>)");
        }
        f.write_str("ByteClasses(")?;
        for class in 0..self.alphabet_len() {
            if class > 0 {
                f.write_str(", ")?;
            }
            let elements = self.elements(class as u8);
            write!(f, "{class} => ")?;
            for range in elements.iter() {
                write!(f, "[{range}]")?;
            }
        }
        f.write_str(")")
    }
}

/// Bytes after which a new class starts.
struct BoundarySet([bool; 256]);

impl BoundarySet {
    fn new() -> Self {
        Self([false; 256])
    }

    fn add(&mut self, start: u8, end: u8) {
        if start > 0 {
            self.0[start as usize - 1] = true;
        }
        self.0[end as usize] = true;
    }

    fn classes(&self) -> ByteClasses {
        let mut classes = [0; 256];
        let mut class = 0u8;
        for byte in 0..=u8::MAX {
            classes[byte as usize] = class;
            if byte < u8::MAX && self.0[byte as usize] {
                class += 1;
            }
        }
        ByteClasses(classes)
    }
}
