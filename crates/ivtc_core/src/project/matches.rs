//! Per-frame field-matching decisions.
//!
//! The track keeps two arrays: the matches as detected by the field matcher
//! ("original") and the matches currently in effect. Either may be empty;
//! an empty current array follows the original one, and an empty original
//! array means every frame is `c`.

use super::error::{ProjectError, ProjectResult};
use crate::models::Match;

/// Order of the quick three-state cycle.
const CYCLE_BCN: [Match; 3] = [Match::N, Match::C, Match::B];

/// Order of the full five-state cycle.
const CYCLE_ALL: [Match; 5] = [Match::U, Match::B, Match::N, Match::C, Match::P];

/// Parse a five-symbol match pattern such as `"cccnn"`.
pub fn parse_match_pattern(pattern: &str) -> ProjectResult<[Match; 5]> {
    let symbols: Vec<char> = pattern.chars().collect();
    if symbols.len() != 5 {
        return Err(ProjectError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "match patterns must be five symbols long",
        });
    }

    let mut out = [Match::C; 5];
    for (slot, &symbol) in out.iter_mut().zip(&symbols) {
        *slot = Match::from_char(symbol).ok_or(ProjectError::InvalidMatch { symbol })?;
    }
    Ok(out)
}

/// Current and original matches for every source frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTrack {
    frame_count: usize,
    current: Vec<Match>,
    original: Vec<Match>,
}

impl MatchTrack {
    /// Create an empty track (every frame `c`).
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            current: Vec::new(),
            original: Vec::new(),
        }
    }

    /// Rebuild a track from persisted arrays.
    ///
    /// Each array must be empty or hold exactly one match per frame.
    pub fn from_parts(
        frame_count: usize,
        current: Vec<Match>,
        original: Vec<Match>,
    ) -> ProjectResult<Self> {
        for (key, array) in [("matches", &current), ("original matches", &original)] {
            if !array.is_empty() && array.len() != frame_count {
                return Err(ProjectError::invalid_value(
                    key,
                    format!("has {} entries, expected {}", array.len(), frame_count),
                ));
            }
        }
        Ok(Self {
            frame_count,
            current,
            original,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Whether the field matcher's results have been recorded.
    pub fn has_original(&self) -> bool {
        !self.original.is_empty()
    }

    /// Raw current array (empty until first written).
    pub fn current_slice(&self) -> &[Match] {
        &self.current
    }

    /// Raw original array (empty until first written).
    pub fn original_slice(&self) -> &[Match] {
        &self.original
    }

    /// Effective match of every frame.
    pub fn effective(&self) -> Vec<Match> {
        (0..self.frame_count).map(|f| self.effective_at(f)).collect()
    }

    fn check_frame(&self, frame: usize) -> ProjectResult<()> {
        if frame >= self.frame_count {
            return Err(ProjectError::frame_out_of_range(frame, self.frame_count));
        }
        Ok(())
    }

    fn effective_at(&self, frame: usize) -> Match {
        self.current
            .get(frame)
            .or_else(|| self.original.get(frame))
            .copied()
            .unwrap_or(Match::C)
    }

    fn original_at(&self, frame: usize) -> Match {
        self.original.get(frame).copied().unwrap_or(Match::C)
    }

    /// Whether `m` can be used at `frame` given the project boundaries.
    pub fn is_allowed(&self, frame: usize, m: Match) -> bool {
        let first = frame == 0;
        let last = frame + 1 == self.frame_count;
        !(first && m.needs_previous()) && !(last && m.needs_next())
    }

    /// Get the match currently in effect at `frame`.
    pub fn get(&self, frame: usize) -> ProjectResult<Match> {
        self.check_frame(frame)?;
        Ok(self.effective_at(frame))
    }

    /// Get the match detected by the field matcher at `frame`.
    pub fn get_original(&self, frame: usize) -> ProjectResult<Match> {
        self.check_frame(frame)?;
        Ok(self.original_at(frame))
    }

    /// Set the match in effect at `frame`.
    ///
    /// `p`/`b` are rejected at the first frame and `n`/`u` at the last one.
    pub fn set(&mut self, frame: usize, m: Match) -> ProjectResult<()> {
        self.check_frame(frame)?;
        if !self.is_allowed(frame, m) {
            return Err(ProjectError::MatchNotAllowed {
                frame,
                symbol: m.as_char(),
            });
        }
        self.materialize_current();
        self.current[frame] = m;
        Ok(())
    }

    /// Record the field matcher's decision for `frame`.
    pub fn set_original(&mut self, frame: usize, m: Match) -> ProjectResult<()> {
        self.check_frame(frame)?;
        if self.original.is_empty() {
            self.original = vec![Match::C; self.frame_count];
        }
        self.original[frame] = m;
        Ok(())
    }

    fn materialize_current(&mut self) {
        if !self.current.is_empty() {
            return;
        }
        self.current = if self.original.is_empty() {
            vec![Match::C; self.frame_count]
        } else {
            self.original.clone()
        };
    }

    fn next_in_cycle(&self, frame: usize, current: Match, order: &[Match]) -> Match {
        let Some(pos) = order.iter().position(|&m| m == current) else {
            return Match::C;
        };
        (1..=order.len())
            .map(|step| order[(pos + step) % order.len()])
            .find(|&m| self.is_allowed(frame, m))
            .unwrap_or(current)
    }

    /// Cycle `n -> c -> b -> n`, skipping `b` at the first frame and `n` at
    /// the last one. `p` and `u` enter the cycle at `c`.
    pub fn cycle_bcn(&mut self, frame: usize) -> ProjectResult<Match> {
        let current = self.get(frame)?;
        let next = self.next_in_cycle(frame, current, &CYCLE_BCN);
        self.set(frame, next)?;
        Ok(next)
    }

    /// Cycle `u -> b -> n -> c -> p -> u`, skipping `p`/`b` at the first
    /// frame and `n`/`u` at the last one.
    pub fn cycle(&mut self, frame: usize) -> ProjectResult<Match> {
        let current = self.get(frame)?;
        let next = self.next_in_cycle(frame, current, &CYCLE_ALL);
        self.set(frame, next)?;
        Ok(next)
    }

    fn check_range(&self, first: usize, last: usize) -> ProjectResult<()> {
        if first > last {
            return Err(ProjectError::InvalidRange {
                range: crate::models::FrameRange::new(first, last),
            });
        }
        self.check_frame(last)
    }

    /// Write `pattern[frame % 5]` to every frame of `[first, last]`.
    ///
    /// Symbols that are not allowed at the project boundaries become `c`.
    pub fn set_range_from_pattern(
        &mut self,
        first: usize,
        last: usize,
        pattern: &[Match; 5],
    ) -> ProjectResult<()> {
        self.check_range(first, last)?;
        self.materialize_current();
        for frame in first..=last {
            let m = pattern[frame % 5];
            self.current[frame] = if self.is_allowed(frame, m) { m } else { Match::C };
        }
        Ok(())
    }

    /// Restore the original matches in `[first, last]`.
    pub fn reset_range(&mut self, first: usize, last: usize) -> ProjectResult<()> {
        self.check_range(first, last)?;
        if self.current.is_empty() {
            return Ok(());
        }
        for frame in first..=last {
            self.current[frame] = self.original_at(frame);
        }
        Ok(())
    }

    /// Effective matches as a string of symbols.
    pub fn to_symbol_string(&self) -> String {
        (0..self.frame_count)
            .map(|f| self.effective_at(f).as_char())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ErrorKind;

    #[test]
    fn empty_track_reads_as_c_then_follows_original() {
        let mut track = MatchTrack::new(4);
        assert_eq!(track.get(2).unwrap(), Match::C);

        track.set_original(2, Match::N).unwrap();
        assert_eq!(track.get(2).unwrap(), Match::N);
        assert_eq!(track.get_original(1).unwrap(), Match::C);

        // First write copies the originals over.
        track.set(0, Match::N).unwrap();
        assert_eq!(track.get(2).unwrap(), Match::N);
        assert_eq!(track.current_slice().len(), 4);
    }

    #[test]
    fn set_rejects_out_of_range_and_boundary_matches() {
        let mut track = MatchTrack::new(3);
        let err = track.set(3, Match::C).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);

        assert!(matches!(
            track.set(0, Match::P),
            Err(ProjectError::MatchNotAllowed { frame: 0, symbol: 'p' })
        ));
        assert!(track.set(0, Match::B).is_err());
        assert!(track.set(2, Match::N).is_err());
        assert!(track.set(2, Match::U).is_err());
        assert!(track.set(1, Match::U).is_ok());
    }

    #[test]
    fn cycle_returns_after_five_steps_on_interior_frames() {
        let mut track = MatchTrack::new(10);
        for &start in Match::all() {
            track.set(4, start).unwrap();
            let mut seen = Vec::new();
            for _ in 0..5 {
                seen.push(track.cycle(4).unwrap());
            }
            assert_eq!(track.get(4).unwrap(), start);
            seen.sort_by_key(|m| m.index());
            assert_eq!(seen, Match::all().to_vec());
        }
    }

    #[test]
    fn cycle_follows_documented_order() {
        let mut track = MatchTrack::new(10);
        track.set(5, Match::U).unwrap();
        let order: Vec<Match> = (0..5).map(|_| track.cycle(5).unwrap()).collect();
        assert_eq!(order, vec![Match::B, Match::N, Match::C, Match::P, Match::U]);
    }

    #[test]
    fn cycle_clamps_at_boundaries() {
        let mut track = MatchTrack::new(10);
        for _ in 0..20 {
            let m = track.cycle(0).unwrap();
            assert!(m != Match::P && m != Match::B);
            let m = track.cycle(9).unwrap();
            assert!(m != Match::N && m != Match::U);
        }
    }

    #[test]
    fn cycle_bcn_transitions() {
        let mut track = MatchTrack::new(10);
        track.set(3, Match::N).unwrap();
        assert_eq!(track.cycle_bcn(3).unwrap(), Match::C);
        assert_eq!(track.cycle_bcn(3).unwrap(), Match::B);
        assert_eq!(track.cycle_bcn(3).unwrap(), Match::N);

        // c -> n at frame 0, b -> c at the last frame.
        assert_eq!(track.cycle_bcn(0).unwrap(), Match::N);
        track.set(9, Match::B).unwrap();
        assert_eq!(track.cycle_bcn(9).unwrap(), Match::C);

        track.set(4, Match::P).unwrap();
        assert_eq!(track.cycle_bcn(4).unwrap(), Match::C);
    }

    #[test]
    fn pattern_writes_clamp_and_reset_restores() {
        let mut track = MatchTrack::new(7);
        for f in 0..7 {
            track.set_original(f, Match::C).unwrap();
        }
        let pattern = parse_match_pattern("bcccn").unwrap();
        track.set_range_from_pattern(0, 6, &pattern).unwrap();
        // The 'b' at frame 0 is not allowed and becomes 'c'.
        assert_eq!(track.to_symbol_string(), "ccccnbc");

        track.reset_range(3, 4).unwrap();
        assert_eq!(track.to_symbol_string(), "cccccbc");
    }

    #[test]
    fn parse_pattern_validates() {
        assert!(parse_match_pattern("ccnn").is_err());
        assert!(matches!(
            parse_match_pattern("ccxnn"),
            Err(ProjectError::InvalidMatch { symbol: 'x' })
        ));
    }

    #[test]
    fn from_parts_checks_lengths() {
        assert!(MatchTrack::from_parts(3, vec![Match::C; 2], Vec::new()).is_err());
        assert!(MatchTrack::from_parts(3, Vec::new(), vec![Match::N; 3]).is_ok());
    }
}
