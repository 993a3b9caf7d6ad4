//! Normalized sets of closed ranges.
//!
//! `RangeSet` keeps its ranges sorted, disjoint and maximally merged after
//! every mutation, so two sets are equal exactly when they contain the same
//! elements. The same type backs scalar classes (`RangeSet<char>`) and byte
//! classes (`RangeSet<u8>`).

use std::cmp::{max, min};
use std::fmt;

/// Element type of a `RangeSet`: totally ordered with a successor function.
///
/// `char` skips the surrogate gap, so `'\u{D7FF}'` and `'\u{E000}'` are
/// adjacent.
pub trait Bound: Copy + Ord + fmt::Debug {
    const MIN: Self;
    const MAX: Self;

    /// Next value. Never called on `MAX`.
    fn increment(self) -> Self;

    /// Previous value. Never called on `MIN`.
    fn decrement(self) -> Self;
}

impl Bound for u8 {
    const MIN: Self = u8::MIN;
    const MAX: Self = u8::MAX;

    fn increment(self) -> Self {
        self + 1
    }

    fn decrement(self) -> Self {
        self - 1
    }
}

impl Bound for char {
    const MIN: Self = '\0';
    const MAX: Self = char::MAX;

    fn increment(self) -> Self {
        match self {
            '\u{D7FF}' => '\u{E000}',
            c => char::from_u32(c as u32 + 1).expect("successor of a non-maximal scalar"),
        }
    }

    fn decrement(self) -> Self {
        match self {
            '\u{E000}' => '\u{D7FF}',
            c => char::from_u32(c as u32 - 1).expect("predecessor of a non-minimal scalar"),
        }
    }
}

/// Closed range `start..=end` with `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassRange<T> {
    start: T,
    end: T,
}

impl<T: Bound> ClassRange<T> {
    /// Bounds are swapped when given in descending order.
    pub fn new(a: T, b: T) -> Self {
        Self {
            start: min(a, b),
            end: max(a, b),
        }
    }

    pub fn single(value: T) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn end(&self) -> T {
        self.end
    }

    pub fn contains(&self, value: T) -> bool {
        self.start <= value && value <= self.end
    }
}

impl fmt::Display for ClassRange<char> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start.escape_debug())
        } else {
            write!(f, "{}-{}", self.start.escape_debug(), self.end.escape_debug())
        }
    }
}

impl fmt::Display for ClassRange<u8> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{:02X}", self.start)
        } else {
            write!(f, "{:02X}-{:02X}", self.start, self.end)
        }
    }
}

/// Sorted, disjoint, non-touching closed ranges.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangeSet<T> {
    ranges: Vec<ClassRange<T>>,
}

/// Set of Unicode scalar values.
pub type CharacterClass = RangeSet<char>;

/// Set of byte values.
pub type ByteSet = RangeSet<u8>;

impl<T> Default for RangeSet<T> {
    fn default() -> Self {
        Self { ranges: Vec::new() }
    }
}

impl<T: Bound> RangeSet<T> {
    pub fn new<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = ClassRange<T>>,
    {
        let mut set = Self {
            ranges: ranges.into_iter().collect(),
        };
        set.canonicalize();
        set
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn full() -> Self {
        Self {
            ranges: vec![ClassRange::new(T::MIN, T::MAX)],
        }
    }

    pub fn singleton(value: T) -> Self {
        Self {
            ranges: vec![ClassRange::single(value)],
        }
    }

    pub fn ranges(&self) -> &[ClassRange<T>] {
        &self.ranges
    }

    pub fn iter(&self) -> impl Iterator<Item = ClassRange<T>> + '_ {
        self.ranges.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ranges.len() == 1 && self.ranges[0].start == T::MIN && self.ranges[0].end == T::MAX
    }

    pub fn contains(&self, value: T) -> bool {
        self.ranges
            .binary_search_by(|r| {
                if r.end < value {
                    std::cmp::Ordering::Less
                } else if r.start > value {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn push(&mut self, range: ClassRange<T>) {
        self.ranges.push(range);
        self.canonicalize();
    }

    pub fn union(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.ranges.extend_from_slice(&other.ranges);
        self.canonicalize();
    }

    pub fn intersect(&mut self, other: &Self) {
        let (a, b) = (&self.ranges, &other.ranges);
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            let lo = max(a[i].start, b[j].start);
            let hi = min(a[i].end, b[j].end);
            if lo <= hi {
                out.push(ClassRange { start: lo, end: hi });
            }
            if a[i].end < b[j].end {
                i += 1;
            } else {
                j += 1;
            }
        }
        self.ranges = out;
        self.canonicalize();
    }

    pub fn difference(&mut self, other: &Self) {
        let mut complement = other.clone();
        complement.invert();
        self.intersect(&complement);
    }

    pub fn symmetric_difference(&mut self, other: &Self) {
        let mut common = self.clone();
        common.intersect(other);
        self.union(other);
        self.difference(&common);
    }

    pub fn invert(&mut self) {
        if self.ranges.is_empty() {
            self.ranges.push(ClassRange::new(T::MIN, T::MAX));
            return;
        }

        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        if self.ranges[0].start > T::MIN {
            out.push(ClassRange {
                start: T::MIN,
                end: self.ranges[0].start.decrement(),
            });
        }
        for pair in self.ranges.windows(2) {
            out.push(ClassRange {
                start: pair[0].end.increment(),
                end: pair[1].start.decrement(),
            });
        }
        let last = self.ranges[self.ranges.len() - 1];
        if last.end < T::MAX {
            out.push(ClassRange {
                start: last.end.increment(),
                end: T::MAX,
            });
        }
        self.ranges = out;
    }

    /// Sort, then merge overlapping and adjacent ranges.
    fn canonicalize(&mut self) {
        if self.is_canonical() {
            return;
        }
        self.ranges.sort_unstable();

        let mut merged: Vec<ClassRange<T>> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if touches(last, &range) => last.end = max(last.end, range.end),
                _ => merged.push(range),
            }
        }
        self.ranges = merged;
    }

    fn is_canonical(&self) -> bool {
        self.ranges
            .windows(2)
            .all(|w| w[0].end < w[1].start && !touches(&w[0], &w[1]))
    }
}

impl RangeSet<char> {
    pub fn is_ascii(&self) -> bool {
        self.ranges.last().is_none_or(|r| r.end.is_ascii())
    }
}

impl RangeSet<u8> {
    /// Number of bytes in the set.
    pub fn len(&self) -> usize {
        self.ranges
            .iter()
            .map(|r| (r.end - r.start) as usize + 1)
            .sum()
    }

    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.ranges.iter().flat_map(|r| r.start..=r.end)
    }
}

impl<T: Bound> FromIterator<ClassRange<T>> for RangeSet<T> {
    fn from_iter<I: IntoIterator<Item = ClassRange<T>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for RangeSet<char> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for range in &self.ranges {
            write!(f, "{range}")?;
        }
        f.write_str("]")
    }
}

/// `b` starts no later than one past `a`'s end. Requires `a <= b` in sort order.
fn touches<T: Bound>(a: &ClassRange<T>, b: &ClassRange<T>) -> bool {
    b.start <= a.end || (a.end < T::MAX && a.end.increment() == b.start)
}
