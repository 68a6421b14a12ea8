//! Choosing which duplicate to drop once a section's pattern is known.

use tracing::debug;

use crate::models::DropDuplicate;
use crate::project::{Project, ProjectError, ProjectEvent, ProjectResult, CYCLE_LENGTH};

/// Mic of `frame` under its current match.
fn current_mic(project: &Project, frame: usize) -> ProjectResult<i16> {
    let m = project.get_match(frame)?;
    project.mic(frame, m)
}

/// Decimate `[start, end)` given the offset of the first duplicate.
///
/// Every cycle holds two consecutive duplicates, at `first_duplicate` and the
/// frame after it. Marks of neighbouring sections sharing a boundary cycle
/// are left alone.
pub(crate) fn apply_pattern_decimation(
    project: &mut Project,
    start: usize,
    end: usize,
    first_duplicate: usize,
    policy: DropDuplicate,
) -> ProjectResult<()> {
    if start >= end {
        return Ok(());
    }
    project.check_frame(end - 1)?;

    let policy = if policy == DropDuplicate::UglierPerCycle && first_duplicate == 4 {
        // The pair straddles two cycles.
        DropDuplicate::UglierPerSection
    } else {
        policy
    };

    if matches!(
        policy,
        DropDuplicate::UglierPerCycle | DropDuplicate::UglierPerSection
    ) && !project.has_mics()
    {
        return Err(ProjectError::MissingMetrics { what: "mics" });
    }

    for frame in start..end {
        project.decimation.delete(frame)?;
    }

    let in_section = |frame: usize| frame >= start && frame < end;
    let first_cycle = start / CYCLE_LENGTH;
    let last_cycle = (end - 1) / CYCLE_LENGTH;

    if policy == DropDuplicate::UglierPerCycle {
        for cycle in first_cycle..=last_cycle {
            let first = cycle * CYCLE_LENGTH + first_duplicate;
            let second = first + 1;
            let drop = match (in_section(first), in_section(second)) {
                (true, true) => {
                    if current_mic(project, first)? > current_mic(project, second)? {
                        first
                    } else {
                        second
                    }
                }
                (true, false) => first,
                (false, true) => second,
                (false, false) => continue,
            };
            project.decimation.add(drop)?;
        }
    } else {
        let offset = match policy {
            DropDuplicate::FirstDuplicate => first_duplicate,
            DropDuplicate::SecondDuplicate => (first_duplicate + 1) % CYCLE_LENGTH,
            _ => {
                let mut votes = [0usize; 2];
                for first in (start..end).filter(|f| f % CYCLE_LENGTH == first_duplicate) {
                    if first + 1 >= end {
                        continue;
                    }
                    let a = current_mic(project, first)?;
                    let b = current_mic(project, first + 1)?;
                    if a > b {
                        votes[0] += 1;
                    } else if b > a {
                        votes[1] += 1;
                    }
                }
                debug!(
                    "Section {}: first duplicate uglier {} times, second {} times",
                    start, votes[0], votes[1]
                );
                if votes[0] > votes[1] {
                    first_duplicate
                } else {
                    (first_duplicate + 1) % CYCLE_LENGTH
                }
            }
        };

        for cycle in first_cycle..=last_cycle {
            let frame = cycle * CYCLE_LENGTH + offset;
            if in_section(frame) {
                project.decimation.add(frame)?;
            }
        }
    }

    project.notify(ProjectEvent::DecimationChanged {
        first: start,
        last: end - 1,
    });
    Ok(())
}

impl Project {
    /// Decimate the section starting at `start` given the offset of the
    /// first duplicate in each cycle.
    pub fn apply_pattern_guessing_decimation(
        &mut self,
        start: usize,
        first_duplicate: usize,
        policy: DropDuplicate,
    ) -> ProjectResult<()> {
        if first_duplicate >= CYCLE_LENGTH {
            return Err(ProjectError::invalid_value(
                "first duplicate",
                format!("{first_duplicate} is not a cycle offset"),
            ));
        }
        let end = self.section_end(start)?;
        apply_pattern_decimation(self, start, end, first_duplicate, policy)
    }
}
