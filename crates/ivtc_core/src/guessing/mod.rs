//! Pattern guessing: recovering the telecine pattern of each section.
//!
//! Two strategies are available behind the [`PatternGuesser`] trait:
//! - [`MicsGuesser`] fits cyclic match patterns against per-frame mics
//! - [`MatchesGuesser`] looks for the `n` -> `c` seam in the field matcher's
//!   original matches
//!
//! Both write the guessed matches over the section and finish by picking
//! which duplicate of every cycle to drop.

mod decimation;
mod matches;
mod mics;

pub use matches::MatchesGuesser;
pub use mics::MicsGuesser;

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::models::{GuessFailureReason, GuessingMethod, GuessingParams, Match};
use crate::project::{Project, ProjectEvent, ProjectResult};

/// Result of guessing one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionOutcome {
    Guessed,
    Failed(GuessFailureReason),
}

/// Trait for pattern guessing strategies.
pub trait PatternGuesser: Send + Sync {
    /// Get the name of this guessing method.
    fn name(&self) -> &'static str;

    /// Fail if the project lacks the metrics this guesser reads.
    fn check_metrics(&self, project: &Project) -> ProjectResult<()>;

    /// Guess the section `[start, end)` and write matches and decimation.
    ///
    /// Returns `Failed` without touching the project when no pattern fits.
    fn guess_section(
        &self,
        project: &mut Project,
        start: usize,
        end: usize,
        params: &GuessingParams,
    ) -> ProjectResult<SectionOutcome>;
}

/// Create a pattern guesser for the given method.
pub fn get_guesser(method: GuessingMethod) -> Box<dyn PatternGuesser> {
    match method {
        GuessingMethod::FromMics => Box::new(MicsGuesser),
        GuessingMethod::FromMatches => Box::new(MatchesGuesser),
    }
}

/// Totals of a project-wide guessing run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuessingSummary {
    pub sections: usize,
    pub guessed: usize,
    /// Section start -> reason.
    pub failures: BTreeMap<usize, GuessFailureReason>,
}

impl fmt::Display for GuessingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} sections guessed, {} failed",
            self.guessed,
            self.sections,
            self.failures.len()
        )
    }
}

/// Write guessed matches over `[start, end)`.
///
/// An `n` on the last frame of the project becomes `b`. The last frame of
/// the section becomes `b` when its mic is more than twice the `b` mic.
pub(crate) fn write_guessed_matches(
    project: &mut Project,
    start: usize,
    end: usize,
    guessed: impl Fn(usize) -> ProjectResult<Match>,
) -> ProjectResult<()> {
    let frame_count = project.frame_count();
    for frame in start..end {
        let mut m = guessed(frame)?;

        if frame + 1 == frame_count && m == Match::N {
            m = Match::B;
        }
        if frame + 1 == end && frame > 0 && project.has_mics() {
            let mics = project.mics(frame)?;
            if i32::from(mics[m.index()]) > 2 * i32::from(mics[Match::B.index()]) {
                m = Match::B;
            }
        }
        if !project.matches.is_allowed(frame, m) {
            m = Match::C;
        }
        project.matches.set(frame, m)?;
    }
    project.notify(ProjectEvent::MatchesChanged {
        first: start,
        last: end - 1,
    });
    Ok(())
}

impl Project {
    fn guess_section_with(
        &mut self,
        guesser: &dyn PatternGuesser,
        start: usize,
        params: &GuessingParams,
    ) -> ProjectResult<SectionOutcome> {
        let end = self.section_end(start)?;
        let outcome = guesser.guess_section(self, start, end, params)?;
        match outcome {
            SectionOutcome::Guessed => {
                debug!("Section {} guessed {}", start, guesser.name());
                self.pattern_guessing.failures.remove(&start);
            }
            SectionOutcome::Failed(reason) => {
                warn!("Section {} not guessed: {}", start, reason.name());
                self.pattern_guessing.failures.insert(start, reason);
            }
        }
        Ok(outcome)
    }

    /// Guess one section by fitting patterns to its mics.
    pub fn guess_section_patterns_from_mics(
        &mut self,
        start: usize,
        params: &GuessingParams,
    ) -> ProjectResult<SectionOutcome> {
        MicsGuesser.check_metrics(self)?;
        let outcome = self.guess_section_with(&MicsGuesser, start, params)?;
        self.notify(ProjectEvent::PatternGuessingChanged);
        Ok(outcome)
    }

    /// Guess one section from the field matcher's original matches.
    pub fn guess_section_patterns_from_matches(
        &mut self,
        start: usize,
        params: &GuessingParams,
    ) -> ProjectResult<SectionOutcome> {
        MatchesGuesser.check_metrics(self)?;
        let outcome = self.guess_section_with(&MatchesGuesser, start, params)?;
        self.notify(ProjectEvent::PatternGuessingChanged);
        Ok(outcome)
    }

    /// Guess every section in ascending order with `params.method`.
    ///
    /// The failure ledger is reset first and `params` is remembered.
    pub fn guess_project_patterns(
        &mut self,
        params: &GuessingParams,
    ) -> ProjectResult<GuessingSummary> {
        let guesser = get_guesser(params.method);
        guesser.check_metrics(self)?;

        info!(
            "Guessing patterns {} for {} sections",
            params.method.name(),
            self.section_count()
        );

        self.pattern_guessing.failures.clear();
        self.pattern_guessing.params = *params;

        let starts: Vec<usize> = self.sections.keys().copied().collect();
        let mut summary = GuessingSummary {
            sections: starts.len(),
            ..Default::default()
        };
        for start in starts {
            match self.guess_section_with(guesser.as_ref(), start, params)? {
                SectionOutcome::Guessed => summary.guessed += 1,
                SectionOutcome::Failed(reason) => {
                    summary.failures.insert(start, reason);
                }
            }
        }

        info!("Pattern guessing finished: {}", summary);
        self.notify(ProjectEvent::PatternGuessingChanged);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DropDuplicate, Mics, PatternSet};
    use crate::project::test_support::project;
    use crate::project::ProjectError;

    /// Mics preferring `c` or `n` at each frame of a rotated `cccnn`.
    fn telecined_mics(frame: usize, offset: usize) -> Mics {
        let pattern = b"cccnn";
        if pattern[(frame + 5 - offset) % 5] == b'c' {
            [30, 5, 40, 30, 30]
        } else {
            [30, 40, 5, 30, 30]
        }
    }

    #[test]
    fn factory_selects_by_method() {
        assert_eq!(get_guesser(GuessingMethod::FromMics).name(), "from mics");
        assert_eq!(
            get_guesser(GuessingMethod::FromMatches).name(),
            "from matches"
        );
    }

    #[test]
    fn project_wide_run_resets_ledger_and_records_params() {
        let mut p = project(40);
        for frame in 0..40 {
            p.set_mics(frame, telecined_mics(frame, 3)).unwrap();
        }
        p.add_section(35).unwrap();
        p.pattern_guessing
            .failures
            .insert(0, GuessFailureReason::AmbiguousPattern);

        let params = GuessingParams {
            method: GuessingMethod::FromMics,
            minimum_length: 10,
            use_patterns: PatternSet::ALL,
            decimation: DropDuplicate::FirstDuplicate,
            ..Default::default()
        };
        let summary = p.guess_project_patterns(&params).unwrap();

        assert_eq!(summary.sections, 2);
        assert_eq!(summary.guessed, 1);
        assert_eq!(
            summary.failures.get(&35),
            Some(&GuessFailureReason::SectionTooShort)
        );
        assert_eq!(p.pattern_guessing().failed(0), None);
        assert_eq!(
            p.pattern_guessing().failed(35),
            Some(GuessFailureReason::SectionTooShort)
        );
        assert_eq!(p.pattern_guessing().params, params);
        assert_eq!(summary.to_string(), "1 of 2 sections guessed, 1 failed");
    }

    #[test]
    fn missing_metrics_abort_before_any_change() {
        let mut p = project(20);
        p.pattern_guessing
            .failures
            .insert(0, GuessFailureReason::AmbiguousPattern);
        let params = GuessingParams {
            method: GuessingMethod::FromMatches,
            ..Default::default()
        };
        let err = p.guess_project_patterns(&params).unwrap_err();
        assert!(matches!(err, ProjectError::MissingMetrics { .. }));
        assert_eq!(p.pattern_guessing().failures.len(), 1);
    }

    #[test]
    fn last_frame_overrides() {
        let mut p = project(10);
        for frame in 0..10 {
            p.set_mics(frame, [0, 10, 10, 10, 0]).unwrap();
        }
        // Section end with a high mic against a low b mic.
        p.set_mics(4, [0, 30, 30, 5, 0]).unwrap();
        p.add_section(5).unwrap();

        write_guessed_matches(&mut p, 0, 5, |_| Ok(Match::C)).unwrap();
        write_guessed_matches(&mut p, 5, 10, |_| Ok(Match::N)).unwrap();
        assert_eq!(p.match_track().to_symbol_string(), "ccccbnnnnb");
    }
}
