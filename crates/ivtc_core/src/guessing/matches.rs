//! Guessing from the field matcher's original matches.
//!
//! In telecined material the field matcher reports `n` on the frame before
//! the pulldown seam and `c` right after it. The cycle position where that
//! `nc` pair shows up most often gives the pattern.

use tracing::debug;

use super::decimation::apply_pattern_decimation;
use super::{write_guessed_matches, PatternGuesser, SectionOutcome};
use crate::models::{GuessFailureReason, GuessingMethod, GuessingParams, Match, ThirdNMatch};
use crate::project::{parse_match_pattern, Project, ProjectError, ProjectResult, CYCLE_LENGTH};

/// Minimum share of `nc` pairs at the best position, in percent.
const MIN_BEST_PERCENT: f64 = 40.0;
/// Minimum lead of the best position over the runner-up, in percent.
const MIN_LEAD_PERCENT: f64 = 10.0;

/// Match templates indexed by the position of the `nc` seam.
const PATTERNS: [&str; 5] = ["ncccn", "nnccc", "cnncc", "ccnnc", "cccnn"];
/// Same templates with a third `n`.
const PATTERNS_THIRD_N: [&str; 5] = ["nccnn", "nnccn", "nnncc", "cnnnc", "ccnnn"];

/// Guesser locating the pulldown seam in the original matches.
pub struct MatchesGuesser;

impl MatchesGuesser {
    /// Number of `nc` pairs starting at each cycle position.
    fn seam_counts(project: &Project, start: usize, end: usize) -> ProjectResult<[usize; 5]> {
        let mut counts = [0usize; 5];
        for frame in start..end.saturating_sub(1) {
            if project.get_original_match(frame)? == Match::N
                && project.get_original_match(frame + 1)? == Match::C
            {
                counts[frame % CYCLE_LENGTH] += 1;
            }
        }
        Ok(counts)
    }

    /// Position of the seam if it stands out clearly enough.
    fn pick_seam(counts: &[usize; 5]) -> Option<usize> {
        let total: usize = counts.iter().sum();
        if total == 0 {
            return None;
        }

        let mut best = 0;
        for position in 1..CYCLE_LENGTH {
            if counts[position] > counts[best] {
                best = position;
            }
        }
        let next_best = (0..CYCLE_LENGTH)
            .filter(|&p| p != best)
            .map(|p| counts[p])
            .max()
            .unwrap_or(0);

        let best_percent = counts[best] as f64 * 100.0 / total as f64;
        let next_percent = next_best as f64 * 100.0 / total as f64;
        (best_percent > MIN_BEST_PERCENT && best_percent - next_percent > MIN_LEAD_PERCENT)
            .then_some(best)
    }
}

impl PatternGuesser for MatchesGuesser {
    fn name(&self) -> &'static str {
        GuessingMethod::FromMatches.name()
    }

    fn check_metrics(&self, project: &Project) -> ProjectResult<()> {
        if !project.has_original_matches() {
            return Err(ProjectError::MissingMetrics {
                what: "original matches",
            });
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
        if end - start < params.minimum_length {
            return Ok(SectionOutcome::Failed(GuessFailureReason::SectionTooShort));
        }

        let counts = Self::seam_counts(project, start, end)?;
        let Some(best) = Self::pick_seam(&counts) else {
            debug!("Section {}: no clear seam in {:?}", start, counts);
            return Ok(SectionOutcome::Failed(GuessFailureReason::AmbiguousPattern));
        };
        debug!("Section {}: seam at position {} ({:?})", start, best, counts);

        let pattern = parse_match_pattern(PATTERNS[best])?;
        let third_n_pattern = parse_match_pattern(PATTERNS_THIRD_N[best])?;
        let third_n_position = (best + 3) % CYCLE_LENGTH;

        let policy = params.third_n_match;
        let has_mics = project.has_mics();
        let guessed: Vec<Match> = (start..end)
            .map(|frame| {
                let position = frame % CYCLE_LENGTH;
                let m = match policy {
                    ThirdNMatch::Always => third_n_pattern[position],
                    ThirdNMatch::Never => pattern[position],
                    ThirdNMatch::IfPrettier if position == third_n_position && has_mics => {
                        let mics = project.mics(frame)?;
                        if mics[Match::N.index()] < mics[Match::C.index()] {
                            Match::N
                        } else {
                            Match::C
                        }
                    }
                    ThirdNMatch::IfPrettier => pattern[position],
                };
                Ok(m)
            })
            .collect::<ProjectResult<_>>()?;

        write_guessed_matches(project, start, end, |frame| Ok(guessed[frame - start]))?;
        apply_pattern_decimation(project, start, end, best, params.decimation)?;
        Ok(SectionOutcome::Guessed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DropDuplicate;
    use crate::project::test_support::project;

    fn project_with_original(symbols: &str) -> Project {
        let mut p = project(symbols.len());
        for (frame, symbol) in symbols.chars().enumerate() {
            let m = Match::from_char(symbol).unwrap();
            p.set_original_match(frame, m).unwrap();
        }
        p
    }

    fn params(third_n_match: ThirdNMatch) -> GuessingParams {
        GuessingParams {
            method: GuessingMethod::FromMatches,
            minimum_length: 10,
            third_n_match,
            decimation: DropDuplicate::FirstDuplicate,
            ..Default::default()
        }
    }

    #[test]
    fn templates_put_the_seam_at_their_index() {
        for (best, template) in PATTERNS.iter().enumerate() {
            let t = template.as_bytes();
            assert_eq!(t[best], b'n');
            assert_eq!(t[(best + 1) % 5], b'c');
        }
        for (best, template) in PATTERNS_THIRD_N.iter().enumerate() {
            let extra = (best + 3) % 5;
            assert_eq!(template.as_bytes()[extra], b'n');
            let mut plain = PATTERNS[best].as_bytes().to_vec();
            plain[extra] = b'n';
            assert_eq!(plain, template.as_bytes());
        }
    }

    #[test]
    fn seam_thresholds() {
        assert_eq!(MatchesGuesser::pick_seam(&[0, 0, 0, 0, 0]), None);
        assert_eq!(MatchesGuesser::pick_seam(&[0, 0, 9, 1, 0]), Some(2));
        // 40% is not enough.
        assert_eq!(MatchesGuesser::pick_seam(&[4, 3, 3, 0, 0]), None);
        // Lead of exactly 10 points is not enough.
        assert_eq!(MatchesGuesser::pick_seam(&[0, 5, 0, 4, 1]), None);
        assert_eq!(MatchesGuesser::pick_seam(&[0, 6, 0, 3, 1]), Some(1));
    }

    #[test]
    fn clean_telecine_is_recognised() {
        // Seam after position 3.
        let mut p = project_with_original(&"cccnc".repeat(5));
        let outcome = p
            .guess_section_patterns_from_matches(0, &params(ThirdNMatch::Never))
            .unwrap();
        assert_eq!(outcome, SectionOutcome::Guessed);

        let symbols = p.match_track().to_symbol_string();
        assert!(symbols.starts_with("ccnncccnnc"));
        let dropped: Vec<usize> = p.decimation_track().decimated_frames().collect();
        assert_eq!(dropped, vec![3, 8, 13, 18, 23]);
    }

    #[test]
    fn third_n_always_and_if_prettier() {
        let original = "cccnc".repeat(5);

        let mut p = project_with_original(&original);
        p.guess_section_patterns_from_matches(0, &params(ThirdNMatch::Always))
            .unwrap();
        assert!(p.match_track().to_symbol_string().starts_with("cnnnccnnnc"));

        let mut p = project_with_original(&original);
        for frame in 0..original.len() {
            // Only frame 1 looks better with n.
            let mics = if frame == 1 {
                [20, 30, 10, 20, 20]
            } else {
                [20, 10, 30, 20, 20]
            };
            p.set_mics(frame, mics).unwrap();
        }
        p.guess_section_patterns_from_matches(0, &params(ThirdNMatch::IfPrettier))
            .unwrap();
        assert!(p.match_track().to_symbol_string().starts_with("cnnncccnnc"));
    }

    #[test]
    fn noisy_matches_are_ambiguous() {
        let mut p = project_with_original("ncncncncncncncncncncncnc");
        let outcome = p
            .guess_section_patterns_from_matches(0, &params(ThirdNMatch::Never))
            .unwrap();
        assert_eq!(
            outcome,
            SectionOutcome::Failed(GuessFailureReason::AmbiguousPattern)
        );
    }

    #[test]
    fn requires_original_matches() {
        let mut p = project(30);
        assert!(matches!(
            p.guess_section_patterns_from_matches(0, &params(ThirdNMatch::Never)),
            Err(ProjectError::MissingMetrics { .. })
        ));
    }
}
