// runes.rs - Code point sets as sorted inclusive ranges.
//
// The parser, builder, matcher and detector all share this one set
// representation. Ranges are kept sorted, merged and non-overlapping;
// every operation preserves that normalization.

use std::fmt;

/// Highest valid code point.
pub const MAX_RUNE: u32 = 0x10FFFF;

/// A set of Unicode code points stored as sorted inclusive ranges.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RuneSet {
    ranges: Vec<(u32, u32)>,
}

impl RuneSet {
    /// The empty set.
    pub fn new() -> RuneSet {
        RuneSet { ranges: Vec::new() }
    }

    /// A set holding one code point.
    pub fn single(rune: u32) -> RuneSet {
        let mut set = RuneSet::new();
        set.add_rune(rune);
        set
    }

    /// A set built from inclusive range pairs (need not be sorted).
    pub fn from_ranges(pairs: &[(u32, u32)]) -> RuneSet {
        let mut set = RuneSet::new();
        for &(lo, hi) in pairs {
            set.add_range(lo, hi);
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of code points in the set.
    pub fn len(&self) -> u32 {
        self.ranges.iter().map(|&(lo, hi)| hi - lo + 1).sum()
    }

    /// The underlying sorted range pairs.
    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }

    /// The lowest code point, if any.
    pub fn min(&self) -> Option<u32> {
        self.ranges.first().map(|&(lo, _)| lo)
    }

    pub fn add_rune(&mut self, rune: u32) {
        self.add_range(rune, rune);
    }

    /// Insert the inclusive range `[lo, hi]`, merging neighbors.
    /// Bounds beyond the rune range are clamped.
    pub fn add_range(&mut self, lo: u32, hi: u32) {
        if lo > hi || lo > MAX_RUNE {
            return;
        }
        let mut lo = lo;
        let mut hi = hi.min(MAX_RUNE);
        // Find the first range that could merge with [lo, hi]; a range
        // ending at lo-1 is adjacent and merges too.
        let mut i = self.ranges.partition_point(|&(_, rhi)| rhi + 1 < lo);
        while i < self.ranges.len() {
            let (rlo, rhi) = self.ranges[i];
            if rlo > hi.saturating_add(1) {
                break;
            }
            lo = lo.min(rlo);
            hi = hi.max(rhi);
            self.ranges.remove(i);
        }
        self.ranges.insert(i, (lo, hi));
    }

    /// Insert every code point of `other`.
    pub fn union_with(&mut self, other: &RuneSet) {
        for &(lo, hi) in &other.ranges {
            self.add_range(lo, hi);
        }
    }

    /// Replace the set with its complement over `[0, MAX_RUNE]`.
    pub fn negate(&mut self) {
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        let mut next = 0u32;
        for &(lo, hi) in &self.ranges {
            if lo > next {
                out.push((next, lo - 1));
            }
            next = hi.saturating_add(1);
            if next > MAX_RUNE {
                self.ranges = out;
                return;
            }
        }
        if next <= MAX_RUNE {
            out.push((next, MAX_RUNE));
        }
        self.ranges = out;
    }

    /// Remove one code point from the set.
    pub fn remove_rune(&mut self, rune: u32) {
        if let Some(i) = self
            .ranges
            .iter()
            .position(|&(lo, hi)| lo <= rune && rune <= hi)
        {
            let (lo, hi) = self.ranges[i];
            self.ranges.remove(i);
            if rune < hi {
                self.ranges.insert(i, (rune + 1, hi));
            }
            if lo < rune {
                self.ranges.insert(i, (lo, rune - 1));
            }
        }
    }

    pub fn contains(&self, rune: u32) -> bool {
        // Binary search over sorted disjoint ranges.
        let i = self.ranges.partition_point(|&(_, hi)| hi < rune);
        i < self.ranges.len() && self.ranges[i].0 <= rune
    }

    /// True when the two sets share at least one code point.
    pub fn intersects(&self, other: &RuneSet) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let (alo, ahi) = self.ranges[i];
            let (blo, bhi) = other.ranges[j];
            if alo <= bhi && blo <= ahi {
                return true;
            }
            if ahi < bhi {
                i += 1;
            } else {
                j += 1;
            }
        }
        false
    }

    /// Add the simple case-folded counterparts of every member.
    ///
    /// Only single-char mappings are applied; multi-char foldings are
    /// outside the supported table format. Ranges wider than 1024 code
    /// points are already case-closed for practical purposes and are
    /// skipped.
    pub fn fold_case(&mut self) {
        let mut folded = RuneSet::new();
        for &(lo, hi) in &self.ranges {
            if hi - lo >= 1024 {
                continue;
            }
            for rune in lo..=hi {
                if let Some(c) = char::from_u32(rune) {
                    let mut upper = c.to_uppercase();
                    if let (Some(u), None) = (upper.next(), upper.next()) {
                        folded.add_rune(u as u32);
                    }
                    let mut lower = c.to_lowercase();
                    if let (Some(l), None) = (lower.next(), lower.next()) {
                        folded.add_rune(l as u32);
                    }
                }
            }
        }
        self.union_with(&folded);
    }

    /// The `n`th code point in set order, for uniform sampling.
    pub fn select(&self, mut n: u32) -> Option<u32> {
        for &(lo, hi) in &self.ranges {
            let span = hi - lo + 1;
            if n < span {
                return Some(lo + n);
            }
            n -= span;
        }
        None
    }
}

impl fmt::Debug for RuneSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, &(lo, hi)) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if lo == hi {
                write!(f, "{:#x}", lo)?;
            } else {
                write!(f, "{:#x}-{:#x}", lo, hi)?;
            }
        }
        write!(f, "}}")
    }
}
