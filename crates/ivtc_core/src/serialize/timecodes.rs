//! Timecodes v1 output.
//!
//! Every run of cycles dropping the same number of frames plays at
//! `fps * (5 - dropped) / 5`. The rate covering the most output frames
//! becomes the `Assume` line; every other run gets its own line in
//! post-decimation frame numbers.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::project::{Project, CYCLE_LENGTH};

/// Output frames `[first, last]` of a run and how many frames its cycles drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RateRun {
    first: usize,
    last: usize,
    num_dropped: usize,
}

fn rate_runs(project: &Project) -> Vec<RateRun> {
    let track = project.decimation_track();
    let ranges = track.ranges();

    ranges
        .iter()
        .enumerate()
        .filter_map(|(i, range)| {
            let end = ranges
                .get(i + 1)
                .map_or(track.frame_count(), |next| next.start);
            let first = track.kept_before(range.start);
            let after = track.kept_before(end);
            (first < after).then_some(RateRun {
                first,
                last: after - 1,
                num_dropped: range.num_dropped,
            })
        })
        .collect()
}

/// Generate a timecodes v1 file for the project's decimation.
pub fn timecodes_v1(project: &Project) -> String {
    let fps = project.source().fps();
    let rate = |num_dropped: usize| {
        fps * (CYCLE_LENGTH - num_dropped) as f64 / CYCLE_LENGTH as f64
    };

    let runs = rate_runs(project);

    let mut frames_per_drop_count: BTreeMap<usize, usize> = BTreeMap::new();
    for run in &runs {
        *frames_per_drop_count.entry(run.num_dropped).or_default() += run.last - run.first + 1;
    }
    // Ties go to the faster rate.
    let mut default_dropped = 0;
    let mut most_frames = 0;
    for (&num_dropped, &frames) in &frames_per_drop_count {
        if frames > most_frames {
            default_dropped = num_dropped;
            most_frames = frames;
        }
    }

    let mut out = String::from("# timecode format v1\n");
    let _ = writeln!(out, "Assume {:.12}", rate(default_dropped));
    for run in runs.iter().filter(|r| r.num_dropped != default_dropped) {
        let _ = writeln!(out, "{},{},{:.12}", run.first, run.last, rate(run.num_dropped));
    }
    out
}
