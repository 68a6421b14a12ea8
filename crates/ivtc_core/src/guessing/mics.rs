//! Guessing from mics.
//!
//! Each candidate pattern is tried at every phase offset. A frame expected
//! to be `c` costs how much worse its `c` mic is than its `n` mic, and the
//! other way round; the cheapest fit wins.

use tracing::debug;

use super::decimation::apply_pattern_decimation;
use super::{write_guessed_matches, PatternGuesser, SectionOutcome};
use crate::models::{GuessFailureReason, GuessingMethod, GuessingParams, Match, PatternSet};
use crate::models::Match::{C, N};
use crate::project::{Project, ProjectError, ProjectEvent, ProjectResult, CYCLE_LENGTH};

/// Candidate patterns in the order they are tried.
static CANDIDATES: [(PatternSet, [Match; 5]); 3] = [
    (PatternSet::CCCNN, [C, C, C, N, N]),
    (PatternSet::CCNNN, [C, C, N, N, N]),
    (PatternSet::CCCCC, [C, C, C, C, C]),
];

/// Symbol at `frame` of `pattern` rotated right by `offset`.
fn symbol_at(pattern: &[Match; 5], offset: usize, frame: usize) -> Match {
    pattern[(frame + CYCLE_LENGTH - offset) % CYCLE_LENGTH]
}

#[derive(Debug, Clone, Copy)]
struct Fit {
    pattern: &'static [Match; 5],
    offset: usize,
    deviation: i64,
}

/// Guesser fitting `cccnn`, `ccnnn` and `ccccc` to mics.
pub struct MicsGuesser;

impl MicsGuesser {
    fn deviation(
        project: &Project,
        start: usize,
        end: usize,
        pattern: &[Match; 5],
        offset: usize,
    ) -> ProjectResult<i64> {
        let mut total = 0i64;
        for frame in start..end {
            let mics = project.mics(frame)?;
            let expected = symbol_at(pattern, offset, frame);
            let alternate = if expected == C { N } else { C };
            let diff = i64::from(mics[expected.index()]) - i64::from(mics[alternate.index()]);
            total += diff.max(0);
        }
        Ok(total)
    }

    fn best_fit(
        project: &Project,
        start: usize,
        end: usize,
        use_patterns: PatternSet,
    ) -> ProjectResult<Option<Fit>> {
        let mut best: Option<Fit> = None;
        for (kind, pattern) in CANDIDATES.iter() {
            if !use_patterns.contains(*kind) {
                continue;
            }
            // All offsets of ccccc are the same pattern.
            let offsets = if *kind == PatternSet::CCCCC { 1 } else { CYCLE_LENGTH };
            for offset in 0..offsets {
                let deviation = Self::deviation(project, start, end, pattern, offset)?;
                if best.map_or(true, |b| deviation < b.deviation) {
                    best = Some(Fit {
                        pattern,
                        offset,
                        deviation,
                    });
                }
            }
        }
        Ok(best)
    }
}

impl PatternGuesser for MicsGuesser {
    fn name(&self) -> &'static str {
        GuessingMethod::FromMics.name()
    }

    fn check_metrics(&self, project: &Project) -> ProjectResult<()> {
        if !project.has_mics() {
            return Err(ProjectError::MissingMetrics { what: "mics" });
        }
        Ok(())
    }

    fn guess_section(
        &self,
        project: &mut Project,
        start: usize,
        end: usize,
        params: &GuessingParams,
    ) -> ProjectResult<SectionOutcome> {
        let length = end - start;
        if length < params.minimum_length {
            return Ok(SectionOutcome::Failed(GuessFailureReason::SectionTooShort));
        }

        let Some(fit) = Self::best_fit(project, start, end, params.use_patterns)? else {
            return Ok(SectionOutcome::Failed(GuessFailureReason::AmbiguousPattern));
        };
        if fit.deviation > length as i64 {
            debug!(
                "Section {}: best deviation {} exceeds length {}",
                start, fit.deviation, length
            );
            return Ok(SectionOutcome::Failed(GuessFailureReason::AmbiguousPattern));
        }

        let pattern = *fit.pattern;
        debug!(
            "Section {}: pattern {} at offset {} (deviation {})",
            start,
            pattern.iter().map(Match::as_char).collect::<String>(),
            fit.offset,
            fit.deviation
        );

        write_guessed_matches(project, start, end, |frame| {
            Ok(symbol_at(&pattern, fit.offset, frame))
        })?;

        if pattern.iter().all(|&m| m == C) {
            for frame in start..end {
                project.decimation.delete(frame)?;
            }
            project.notify(ProjectEvent::DecimationChanged {
                first: start,
                last: end - 1,
            });
        } else {
            let first_duplicate = (4 + fit.offset) % CYCLE_LENGTH;
            apply_pattern_decimation(project, start, end, first_duplicate, params.decimation)?;
        }
        Ok(SectionOutcome::Guessed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DropDuplicate, Mics};
    use crate::project::test_support::project;

    /// Mics where `c` looks right on `c` frames of the rotated pattern and
    /// `n` looks right on `n` frames.
    fn pattern_mics(pattern: &[Match; 5], offset: usize, frame: usize) -> Mics {
        if symbol_at(pattern, offset, frame) == C {
            [30, 5, 40, 30, 30]
        } else {
            [30, 40, 5, 30, 30]
        }
    }

    fn params() -> GuessingParams {
        GuessingParams {
            method: GuessingMethod::FromMics,
            minimum_length: 10,
            decimation: DropDuplicate::FirstDuplicate,
            use_patterns: PatternSet::ALL,
            ..Default::default()
        }
    }

    #[test]
    fn n_mics_higher_at_offset_two_selects_offset_two() {
        let mut p = project(20);
        let cccnn = [C, C, C, N, N];
        for frame in 0..20 {
            p.set_mics(frame, pattern_mics(&cccnn, 2, frame)).unwrap();
        }

        let fit = MicsGuesser::best_fit(&p, 0, 20, PatternSet::ALL)
            .unwrap()
            .unwrap();
        assert_eq!(fit.offset, 2);
        assert_eq!(*fit.pattern, cccnn);
        assert_eq!(fit.deviation, 0);

        let outcome = p.guess_section_patterns_from_mics(0, &params()).unwrap();
        assert_eq!(outcome, SectionOutcome::Guessed);
        assert_eq!(p.pattern_guessing().failed(0), None);
        assert_eq!(
            p.match_track().to_symbol_string(),
            "nncccnncccnncccnnccc"
        );
        // First duplicate at offset (4 + 2) % 5.
        let dropped: Vec<usize> = p.decimation_track().decimated_frames().collect();
        assert_eq!(dropped, vec![1, 6, 11, 16]);
    }

    #[test]
    fn ccnnn_wins_when_it_fits_better() {
        let mut p = project(30);
        let ccnnn = [C, C, N, N, N];
        for frame in 0..30 {
            p.set_mics(frame, pattern_mics(&ccnnn, 1, frame)).unwrap();
        }
        let fit = MicsGuesser::best_fit(&p, 0, 30, PatternSet::ALL)
            .unwrap()
            .unwrap();
        assert_eq!((*fit.pattern, fit.offset), (ccnnn, 1));

        // Without ccnnn the best remaining fit is too far off.
        let outcome = p
            .guess_section_patterns_from_mics(
                0,
                &GuessingParams {
                    use_patterns: PatternSet::CCCNN | PatternSet::CCCCC,
                    ..params()
                },
            )
            .unwrap();
        assert_eq!(
            outcome,
            SectionOutcome::Failed(GuessFailureReason::AmbiguousPattern)
        );
        assert_eq!(
            p.pattern_guessing().failed(0),
            Some(GuessFailureReason::AmbiguousPattern)
        );
        assert_eq!(p.match_track().current_slice().len(), 0);
    }

    #[test]
    fn progressive_section_clears_decimation() {
        let mut p = project(15);
        for frame in 0..15 {
            p.set_mics(frame, [30, 5, 40, 30, 30]).unwrap();
        }
        p.add_decimated_frame(3).unwrap();
        p.add_decimated_frame(8).unwrap();

        let outcome = p.guess_section_patterns_from_mics(0, &params()).unwrap();
        assert_eq!(outcome, SectionOutcome::Guessed);
        assert_eq!(p.match_track().to_symbol_string(), "c".repeat(15));
        assert_eq!(p.post_decimation_frame_count(), 15);
    }

    #[test]
    fn short_sections_fail_without_changes() {
        let mut p = project(30);
        for frame in 0..30 {
            p.set_mics(frame, [0, 1, 2, 3, 4]).unwrap();
        }
        p.add_section(25).unwrap();
        let outcome = p.guess_section_patterns_from_mics(25, &params()).unwrap();
        assert_eq!(
            outcome,
            SectionOutcome::Failed(GuessFailureReason::SectionTooShort)
        );
        assert_eq!(p.match_track().current_slice().len(), 0);
    }

    #[test]
    fn requires_mics() {
        let mut p = project(30);
        assert!(matches!(
            p.guess_section_patterns_from_mics(0, &params()),
            Err(ProjectError::MissingMetrics { what: "mics" })
        ));
    }
}
