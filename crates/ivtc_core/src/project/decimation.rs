//! Per-cycle decimation state and frame-number translation.
//!
//! Frames are grouped into cycles of five. Each cycle remembers which of
//! its offsets are dropped; the post-decimation frame count is kept in sync
//! with every change.

use super::error::{ProjectError, ProjectResult};
use crate::models::DecimationRange;

/// Frames per decimation cycle.
pub const CYCLE_LENGTH: usize = 5;

/// Set of dropped offsets within one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleDrops(u8);

impl CycleDrops {
    pub fn contains(&self, offset: usize) -> bool {
        offset < CYCLE_LENGTH && self.0 & (1 << offset) != 0
    }

    /// Returns true if the offset was not dropped before.
    fn insert(&mut self, offset: usize) -> bool {
        let had = self.contains(offset);
        self.0 |= 1 << offset;
        !had
    }

    /// Returns true if the offset was dropped before.
    fn remove(&mut self, offset: usize) -> bool {
        let had = self.contains(offset);
        self.0 &= !(1 << offset);
        had
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Dropped offsets in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..CYCLE_LENGTH).filter(move |&o| self.contains(o))
    }
}

/// Dropped frames of every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimationTrack {
    frame_count: usize,
    cycles: Vec<CycleDrops>,
    post_decimation_count: usize,
}

impl DecimationTrack {
    /// Create a track with nothing dropped.
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            cycles: vec![CycleDrops::default(); frame_count.div_ceil(CYCLE_LENGTH)],
            post_decimation_count: frame_count,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Number of frames left after decimation.
    pub fn post_decimation_count(&self) -> usize {
        self.post_decimation_count
    }

    /// Number of cycles, the last one possibly partial.
    pub fn cycle_count(&self) -> usize {
        self.cycles.len()
    }

    /// Dropped offsets of one cycle.
    pub fn cycle_drops(&self, cycle: usize) -> CycleDrops {
        self.cycles.get(cycle).copied().unwrap_or_default()
    }

    fn check_frame(&self, frame: usize) -> ProjectResult<()> {
        if frame >= self.frame_count {
            return Err(ProjectError::frame_out_of_range(frame, self.frame_count));
        }
        Ok(())
    }

    /// Mark `frame` as dropped. Returns whether anything changed.
    pub fn add(&mut self, frame: usize) -> ProjectResult<bool> {
        self.check_frame(frame)?;
        let changed = self.cycles[frame / CYCLE_LENGTH].insert(frame % CYCLE_LENGTH);
        if changed {
            self.post_decimation_count -= 1;
        }
        Ok(changed)
    }

    /// Unmark `frame`. Returns whether anything changed.
    pub fn delete(&mut self, frame: usize) -> ProjectResult<bool> {
        self.check_frame(frame)?;
        let changed = self.cycles[frame / CYCLE_LENGTH].remove(frame % CYCLE_LENGTH);
        if changed {
            self.post_decimation_count += 1;
        }
        Ok(changed)
    }

    pub fn is_decimated(&self, frame: usize) -> ProjectResult<bool> {
        self.check_frame(frame)?;
        Ok(self.is_dropped(frame))
    }

    fn is_dropped(&self, frame: usize) -> bool {
        self.cycles[frame / CYCLE_LENGTH].contains(frame % CYCLE_LENGTH)
    }

    /// Undrop every frame of the cycle containing `frame`.
    pub fn clear_cycle(&mut self, frame: usize) -> ProjectResult<()> {
        self.check_frame(frame)?;
        let cycle = &mut self.cycles[frame / CYCLE_LENGTH];
        self.post_decimation_count += cycle.len();
        *cycle = CycleDrops::default();
        Ok(())
    }

    /// All dropped source frames in ascending order.
    pub fn decimated_frames(&self) -> impl Iterator<Item = usize> + '_ {
        self.cycles
            .iter()
            .enumerate()
            .flat_map(|(cycle, drops)| drops.iter().map(move |o| cycle * CYCLE_LENGTH + o))
    }

    /// Number of surviving frames before `frame`.
    ///
    /// This is the exclusive post-decimation end of a range ending just
    /// before `frame`.
    pub fn kept_before(&self, frame: usize) -> usize {
        if frame >= self.frame_count {
            return self.post_decimation_count;
        }

        let cycle = frame / CYCLE_LENGTH;
        let position = frame % CYCLE_LENGTH;

        let dropped_before: usize = self.cycles[..cycle].iter().map(|c| c.len()).sum();
        let kept_in_cycle = (0..position)
            .filter(|&o| !self.cycles[cycle].contains(o))
            .count();
        cycle * CYCLE_LENGTH - dropped_before + kept_in_cycle
    }

    /// Translate a source frame number to its post-decimation number.
    ///
    /// A dropped frame maps to the number of the next surviving frame, except
    /// at the very end of the source where it maps to the last surviving frame
    /// so inclusive ranges ending there stay inside the output. Frames past
    /// the end map to the post-decimation frame count.
    pub fn frame_number_after_decimation(&self, frame: usize) -> usize {
        let out = self.kept_before(frame);

        if frame > 0 && frame + 1 == self.frame_count && self.is_dropped(frame) {
            // Never go below the previous frame's number.
            return out
                .saturating_sub(1)
                .max(self.frame_number_after_decimation(frame - 1));
        }
        out
    }

    /// Runs of consecutive cycles dropping the same number of frames.
    pub fn ranges(&self) -> Vec<DecimationRange> {
        let mut ranges: Vec<DecimationRange> = Vec::new();
        for (cycle, drops) in self.cycles.iter().enumerate() {
            let num_dropped = drops.len();
            match ranges.last() {
                Some(last) if last.num_dropped == num_dropped => {}
                _ => ranges.push(DecimationRange {
                    start: cycle * CYCLE_LENGTH,
                    num_dropped,
                }),
            }
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_delete_are_idempotent() {
        let mut track = DecimationTrack::new(12);
        assert_eq!(track.cycle_count(), 3);

        assert!(track.add(4).unwrap());
        assert!(!track.add(4).unwrap());
        assert_eq!(track.post_decimation_count(), 11);

        assert!(track.delete(4).unwrap());
        assert!(!track.delete(4).unwrap());
        assert_eq!(track.post_decimation_count(), 12);

        assert!(track.add(12).is_err());
    }

    #[test]
    fn frame_numbers_skip_dropped_frames() {
        let mut track = DecimationTrack::new(15);
        track.add(2).unwrap();
        track.add(9).unwrap();

        assert_eq!(track.frame_number_after_decimation(0), 0);
        assert_eq!(track.frame_number_after_decimation(1), 1);
        assert_eq!(track.frame_number_after_decimation(2), 2);
        assert_eq!(track.frame_number_after_decimation(3), 2);
        assert_eq!(track.frame_number_after_decimation(5), 4);
        assert_eq!(track.frame_number_after_decimation(10), 8);
        assert_eq!(track.frame_number_after_decimation(14), 12);
        assert_eq!(track.frame_number_after_decimation(100), 13);
    }

    #[test]
    fn dropped_last_frame_maps_to_last_survivor() {
        let mut track = DecimationTrack::new(10);
        track.add(9).unwrap();
        assert_eq!(track.frame_number_after_decimation(8), 8);
        assert_eq!(track.frame_number_after_decimation(9), 8);
    }

    #[test]
    fn mapping_is_monotonic() {
        let mut track = DecimationTrack::new(23);
        for frame in [0, 3, 4, 8, 12, 13, 14, 21, 22] {
            track.add(frame).unwrap();
        }
        let mapped: Vec<usize> = (0..23)
            .map(|f| track.frame_number_after_decimation(f))
            .collect();
        assert_eq!(mapped[0], 0);
        assert!(mapped.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn toggling_only_affects_later_frames() {
        let mut track = DecimationTrack::new(20);
        track.add(3).unwrap();
        let before: Vec<usize> = (0..20)
            .map(|f| track.frame_number_after_decimation(f))
            .collect();

        track.add(11).unwrap();
        for f in 0..=11 {
            assert_eq!(track.frame_number_after_decimation(f), before[f]);
        }
        assert_eq!(track.frame_number_after_decimation(12), before[12] - 1);
    }

    #[test]
    fn kept_before_ignores_the_end_adjustment() {
        let mut track = DecimationTrack::new(10);
        track.add(3).unwrap();
        track.add(9).unwrap();
        assert_eq!(track.kept_before(3), 3);
        assert_eq!(track.kept_before(4), 3);
        assert_eq!(track.kept_before(9), 8);
        assert_eq!(track.kept_before(10), 8);
        assert_eq!(track.frame_number_after_decimation(9), 7);
    }

    #[test]
    fn clear_cycle_restores_count() {
        let mut track = DecimationTrack::new(10);
        track.add(5).unwrap();
        track.add(7).unwrap();
        track.clear_cycle(6).unwrap();
        assert_eq!(track.post_decimation_count(), 10);
        assert_eq!(track.decimated_frames().count(), 0);
    }

    #[test]
    fn ranges_group_cycles_by_drop_count() {
        let mut track = DecimationTrack::new(25);
        track.add(1).unwrap();
        track.add(6).unwrap();
        track.add(20).unwrap();
        let ranges = track.ranges();
        assert_eq!(
            ranges,
            vec![
                DecimationRange {
                    start: 0,
                    num_dropped: 1,
                },
                DecimationRange {
                    start: 10,
                    num_dropped: 0,
                },
                DecimationRange {
                    start: 20,
                    num_dropped: 1,
                },
            ]
        );
    }
}
