//! Scalar ranges to UTF-8 byte-range sequences.
//!
//! `Utf8Sequences` splits a range of scalar values until every piece encodes
//! to a product of per-position byte ranges. The union of the produced
//! sequences matches exactly the UTF-8 encodings of the input range: no
//! surrogates, no overlong forms, nothing past `U+10FFFF`.

use std::fmt;


const MAX_UTF8_BYTES: usize = 4;

/// Largest scalar value encodable in 1, 2, 3 and 4 bytes.
const MAX_SCALAR_BY_LEN: [u32; MAX_UTF8_BYTES] = [0x7F, 0x7FF, 0xFFFF, 0x10FFFF];

const SURROGATE_START: u32 = 0xD800;
const SURROGATE_END: u32 = 0xDFFF;

/// Closed byte range at one position of an encoded sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Utf8Range {
    pub start: u8,
    pub end: u8,
}

impl Utf8Range {
    pub fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    pub fn matches(&self, byte: u8) -> bool {
        self.start <= byte && byte <= self.end
    }
}

impl fmt::Display for Utf8Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "[{:02X}]", self.start)
        } else {
            write!(f, "[{:02X}-{:02X}]", self.start, self.end)
        }
    }
}

/// One to four byte ranges, matched position by position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Utf8Sequence {
    One(Utf8Range),
    Two([Utf8Range; 2]),
    Three([Utf8Range; 3]),
    Four([Utf8Range; 4]),
}

impl Utf8Sequence {
    /// Pair up equal-length encodings of a range's first and last scalar.
    fn from_encoded_range(start: &[u8], end: &[u8]) -> Self {
        debug_assert_eq!(start.len(), end.len());
        let r = |i: usize| Utf8Range::new(start[i], end[i]);
        match start.len() {
            1 => Self::One(r(0)),
            2 => Self::Two([r(0), r(1)]),
            3 => Self::Three([r(0), r(1), r(2)]),
            _ => Self::Four([r(0), r(1), r(2), r(3)]),
        }
    }

    pub fn as_slice(&self) -> &[Utf8Range] {
        match self {
            Self::One(r) => std::slice::from_ref(r),
            Self::Two(r) => r,
            Self::Three(r) => r,
            Self::Four(r) => r,
        }
    }

    /// Number of bytes in every string this sequence matches.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True when `bytes` is exactly one encoding matched by this sequence.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        let ranges = self.as_slice();
        bytes.len() == ranges.len() && ranges.iter().zip(bytes).all(|(r, &b)| r.matches(b))
    }
}

impl fmt::Display for Utf8Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slice().iter().try_for_each(|r| write!(f, "{r}"))
    }
}

/// Iterator over the byte-range sequences of a scalar range, in ascending
/// order of the scalars they cover.
#[derive(Clone, Debug)]
pub struct Utf8Sequences {
    stack: Vec<ScalarRange>,
}

impl Utf8Sequences {
    pub fn new(start: char, end: char) -> Self {
        let mut seqs = Self { stack: Vec::new() };
        seqs.reset(start, end);
        seqs
    }

    /// Restart iteration over a new range, keeping the allocation.
    pub fn reset(&mut self, start: char, end: char) {
        self.stack.clear();
        self.stack.push(ScalarRange::new(start as u32, end as u32));
    }
}

impl Iterator for Utf8Sequences {
    type Item = Utf8Sequence;

    fn next(&mut self) -> Option<Utf8Sequence> {
        'stack: while let Some(mut range) = self.stack.pop() {
            'split: loop {
                if let Some((low, high)) = range.split_surrogates() {
                    self.stack.push(high);
                    range = low;
                    continue 'split;
                }
                if range.start > range.end {
                    continue 'stack;
                }

                // One encoded length per piece.
                for &max in &MAX_SCALAR_BY_LEN[..MAX_UTF8_BYTES - 1] {
                    if range.start <= max && max < range.end {
                        self.stack.push(ScalarRange::new(max + 1, range.end));
                        range.end = max;
                        continue 'split;
                    }
                }

                if range.end <= MAX_SCALAR_BY_LEN[0] {
                    return Some(Utf8Sequence::One(Utf8Range::new(
                        range.start as u8,
                        range.end as u8,
                    )));
                }

                // Align on continuation-byte boundaries so each byte
                // position varies independently.
                for i in 1..MAX_UTF8_BYTES {
                    let mask = (1u32 << (6 * i)) - 1;
                    if range.start & !mask == range.end & !mask {
                        continue;
                    }
                    if range.start & mask != 0 {
                        self.stack
                            .push(ScalarRange::new((range.start | mask) + 1, range.end));
                        range.end = range.start | mask;
                        continue 'split;
                    }
                    if range.end & mask != mask {
                        self.stack.push(ScalarRange::new(range.end & !mask, range.end));
                        range.end = (range.end & !mask) - 1;
                        continue 'split;
                    }
                }

                let mut start = [0; MAX_UTF8_BYTES];
                let mut end = [0; MAX_UTF8_BYTES];
                let n = encode(range.start, &mut start);
                let m = encode(range.end, &mut end);
                debug_assert_eq!(n, m);
                return Some(Utf8Sequence::from_encoded_range(&start[..n], &end[..m]));
            }
        }
        None
    }
}

#[derive(Clone, Copy, Debug)]
struct ScalarRange {
    start: u32,
    end: u32,
}

impl ScalarRange {
    fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Split around the surrogate block when the range straddles it.
    fn split_surrogates(&self) -> Option<(ScalarRange, ScalarRange)> {
        if self.start < SURROGATE_START && self.end > SURROGATE_END {
            Some((
                ScalarRange::new(self.start, SURROGATE_START - 1),
                ScalarRange::new(SURROGATE_END + 1, self.end),
            ))
        } else {
            None
        }
    }
}

/// Encode a scalar value, returning the number of bytes written.
fn encode(cp: u32, dst: &mut [u8; MAX_UTF8_BYTES]) -> usize {
    let cont = |shift: u32| 0x80 | ((cp >> shift) & 0x3F) as u8;
    if cp <= MAX_SCALAR_BY_LEN[0] {
        dst[0] = cp as u8;
        1
    } else if cp <= MAX_SCALAR_BY_LEN[1] {
        dst[0] = 0xC0 | (cp >> 6) as u8;
        dst[1] = cont(0);
        2
    } else if cp <= MAX_SCALAR_BY_LEN[2] {
        dst[0] = 0xE0 | (cp >> 12) as u8;
        dst[1] = cont(6);
        dst[2] = cont(0);
        3
    } else {
        dst[0] = 0xF0 | (cp >> 18) as u8;
        dst[1] = cont(12);
        dst[2] = cont(6);
        dst[3] = cont(0);
        4
    }
}
