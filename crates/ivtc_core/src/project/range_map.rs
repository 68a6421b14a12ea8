//! Ordered store of non-overlapping frame ranges.
//!
//! Entries are keyed by the first frame of their range. Overlap checks only
//! look at the neighbours of the inserted range, so every operation is
//! O(log n).

use std::collections::btree_map::{self, BTreeMap};

use super::error::{ProjectError, ProjectResult};
use crate::models::{FrameRange, Ranged};

/// Map of disjoint closed ranges, keyed by range start.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeMap<T: Ranged = FrameRange> {
    entries: BTreeMap<usize, T>,
}

impl<T: Ranged> Default for RangeMap<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: Ranged> RangeMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry.
    ///
    /// Fails without touching the map if the entry's range is malformed or
    /// shares a frame with an existing entry.
    pub fn insert(&mut self, item: T) -> ProjectResult<()> {
        let range = item.frame_range();
        if !range.is_valid() {
            return Err(ProjectError::InvalidRange { range });
        }
        if let Some(existing) = self.find_overlap(range) {
            return Err(ProjectError::Overlap { range, existing });
        }
        self.entries.insert(range.first, item);
        Ok(())
    }

    /// Existing range overlapping `range`, if any.
    pub fn find_overlap(&self, range: FrameRange) -> Option<FrameRange> {
        // Predecessor: last entry starting at or before our first frame.
        if let Some((_, prev)) = self.entries.range(..=range.first).next_back() {
            let prev = prev.frame_range();
            if prev.overlaps(&range) {
                return Some(prev);
            }
        }
        // Successor: first entry starting after our first frame.
        if let Some((_, next)) = self
            .entries
            .range(range.first.saturating_add(1)..)
            .next()
        {
            let next = next.frame_range();
            if next.overlaps(&range) {
                return Some(next);
            }
        }
        None
    }

    /// Remove the entry starting at `start`.
    pub fn erase(&mut self, start: usize) -> Option<T> {
        self.entries.remove(&start)
    }

    /// Entry whose range contains `frame`.
    pub fn find(&self, frame: usize) -> Option<&T> {
        self.entries
            .range(..=frame)
            .next_back()
            .map(|(_, item)| item)
            .filter(|item| item.frame_range().contains(frame))
    }

    /// Entry starting exactly at `start`.
    pub fn get(&self, start: usize) -> Option<&T> {
        self.entries.get(&start)
    }

    /// First entry starting after `frame`.
    pub fn next_after(&self, frame: usize) -> Option<&T> {
        self.entries
            .range(frame.saturating_add(1)..)
            .next()
            .map(|(_, item)| item)
    }

    /// Last entry starting before `frame`.
    pub fn previous_before(&self, frame: usize) -> Option<&T> {
        self.entries.range(..frame).next_back().map(|(_, item)| item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in ascending order of start frame.
    pub fn iter(&self) -> btree_map::Values<'_, usize, T> {
        self.entries.values()
    }

    /// Ranges in ascending order.
    pub fn ranges(&self) -> impl Iterator<Item = FrameRange> + '_ {
        self.entries.values().map(|item| item.frame_range())
    }

    /// Last frame covered by any entry.
    pub fn max_frame(&self) -> Option<usize> {
        self.entries
            .values()
            .next_back()
            .map(|item| item.frame_range().last)
    }
}

impl<'a, T: Ranged> IntoIterator for &'a RangeMap<T> {
    type Item = &'a T;
    type IntoIter = btree_map::Values<'a, usize, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
