//! Source-side coverage bookkeeping.
//!
//! A `CoverageSet` is a fixed-size bit vector over source token positions,
//! packed into `u64` words so that union and cardinality stay cheap for
//! sentences of a few hundred tokens.

use std::fmt;
use std::ops::Range;

const WORD_BITS: usize = u64::BITS as usize;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CoverageSet {
    words: Vec<u64>,
    size: usize,
}

impl CoverageSet {
    /// All positions unset.
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size.div_ceil(WORD_BITS)],
            size,
        }
    }

    /// A set with exactly `range` covered.
    pub fn with_range(size: usize, range: Range<usize>) -> Self {
        let mut set = Self::new(size);
        set.set_range(range);
        set
    }

    /// Number of source positions this set is defined over.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn set(&mut self, pos: usize) {
        debug_assert!(pos < self.size, "position {pos} outside coverage of size {}", self.size);
        self.words[pos / WORD_BITS] |= 1 << (pos % WORD_BITS);
    }

    pub fn set_range(&mut self, range: Range<usize>) {
        for pos in range {
            self.set(pos);
        }
    }

    pub fn get(&self, pos: usize) -> bool {
        pos < self.size && self.words[pos / WORD_BITS] & (1 << (pos % WORD_BITS)) != 0
    }

    pub fn cardinality(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn is_complete(&self) -> bool {
        self.cardinality() == self.size
    }

    /// In-place union. Both sets must be sized to the same sentence.
    pub fn union_with(&mut self, other: &CoverageSet) {
        debug_assert_eq!(self.size, other.size);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
    }

    /// Positions set in `self` but not in `other`.
    pub fn difference(&self, other: &CoverageSet) -> CoverageSet {
        debug_assert_eq!(self.size, other.size);
        CoverageSet {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & !b)
                .collect(),
            size: self.size,
        }
    }

    pub fn intersects(&self, other: &CoverageSet) -> bool {
        self.words.iter().zip(&other.words).any(|(a, b)| a & b != 0)
    }

    /// True if every position of `other` is also set in `self`.
    pub fn is_superset(&self, other: &CoverageSet) -> bool {
        self.words.iter().zip(&other.words).all(|(a, b)| b & !a == 0)
    }

    /// Covered positions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).filter(move |&p| self.get(p))
    }

    pub fn first_unset(&self) -> Option<usize> {
        (0..self.size).find(|&p| !self.get(p))
    }

    /// Maximal runs of uncovered positions, left to right.
    pub fn gaps(&self) -> Vec<Range<usize>> {
        let mut gaps = Vec::new();
        let mut start = None;
        for pos in 0..self.size {
            match (self.get(pos), start) {
                (false, None) => start = Some(pos),
                (true, Some(s)) => {
                    gaps.push(s..pos);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            gaps.push(s..self.size);
        }
        gaps
    }
}

impl fmt::Display for CoverageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, pos) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{pos}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for CoverageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoverageSet({}/{} {})", self.cardinality(), self.size, self)
    }
}
