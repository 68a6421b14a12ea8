//! Frame ranges and per-frame metric types.

use serde::{Deserialize, Serialize};

/// Per-frame mics, one per match in `Match::index()` order (p, c, n, b, u).
pub type Mics = [i16; 5];

/// Inclusive range of source frames.
///
/// A valid range has `first <= last`; containers reject anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameRange {
    pub first: usize,
    pub last: usize,
}

impl FrameRange {
    /// Create a range without checking the order of its ends.
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// Create a range from two ends in either order.
    pub fn ordered(a: usize, b: usize) -> Self {
        Self {
            first: a.min(b),
            last: a.max(b),
        }
    }

    /// Range covering a single frame.
    pub fn single(frame: usize) -> Self {
        Self::new(frame, frame)
    }

    /// Whether `first <= last`.
    pub fn is_valid(&self) -> bool {
        self.first <= self.last
    }

    /// Number of frames in the range.
    pub fn len(&self) -> usize {
        self.last.saturating_sub(self.first) + 1
    }

    /// Ranges always hold at least one frame.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `frame` lies inside the range.
    pub fn contains(&self, frame: usize) -> bool {
        self.first <= frame && frame <= self.last
    }

    /// Whether two ranges share at least one frame.
    pub fn overlaps(&self, other: &FrameRange) -> bool {
        self.first <= other.last && other.first <= self.last
    }
}

impl std::fmt::Display for FrameRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.first, self.last)
    }
}

/// Anything that occupies a contiguous range of frames.
///
/// Implemented by the values stored in a `RangeMap`.
pub trait Ranged {
    fn frame_range(&self) -> FrameRange;
}

impl Ranged for FrameRange {
    fn frame_range(&self) -> FrameRange {
        *self
    }
}

/// Run of consecutive cycles that all drop the same number of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimationRange {
    /// First source frame of the run (always a cycle start).
    pub start: usize,
    /// Frames dropped in each cycle of the run.
    pub num_dropped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_swaps_ends() {
        let r = FrameRange::ordered(9, 3);
        assert_eq!(r, FrameRange::new(3, 9));
        assert_eq!(r.len(), 7);
    }

    #[test]
    fn overlap_is_inclusive() {
        let a = FrameRange::new(0, 10);
        assert!(a.overlaps(&FrameRange::new(10, 12)));
        assert!(!a.overlaps(&FrameRange::new(11, 12)));
        assert!(FrameRange::new(2, 3).overlaps(&a));
    }
}
