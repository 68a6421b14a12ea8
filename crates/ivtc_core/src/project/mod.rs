//! The inverse-telecine project model.
//!
//! A [`Project`] owns every per-frame track and every registry of one
//! source video. All frame numbers are post-source numbers (after trims).
//!
//! The model is single-threaded: every mutator is a short synchronous call
//! that validates before touching state, so a rejected call leaves the
//! project unchanged. Registries live in their own files as `impl Project`
//! blocks:
//! - `sections`: section boundaries and their preset lists
//! - `presets`: named script fragments with cascading rename/delete
//! - `custom_lists`: positioned preset applications over frame ranges
//! - `annotations`: freeze frames, bookmarks, combed frames, interlaced fades

mod annotations;
mod custom_lists;
mod decimation;
mod error;
mod events;
mod matches;
mod presets;
mod range_map;
mod sections;

pub use custom_lists::CustomList;
pub use decimation::{CycleDrops, DecimationTrack, CYCLE_LENGTH};
pub use error::{ErrorKind, ProjectError, ProjectResult};
pub use events::{ChangeCallback, Observers, ProjectEvent, SubscriptionId};
pub use matches::{parse_match_pattern, MatchTrack};
pub use presets::is_name_safe;
pub use range_map::RangeMap;
pub use sections::parse_decimation_pattern;

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    Bookmark, Crop, DecimationRange, Depth, FrameRange, FreezeFrame, InterlacedFade, Match, Mics,
    PatternGuessing, Preset, ProjectVariant, Resize, Section, SourceInfo, UiState,
};

/// One source video and every decision made about it.
#[derive(Debug)]
pub struct Project {
    pub(crate) variant: ProjectVariant,
    pub(crate) source: SourceInfo,
    pub(crate) trims: RangeMap,
    pub(crate) frame_count: usize,

    pub(crate) vfm_parameters: BTreeMap<String, f64>,
    pub(crate) vdecimate_parameters: BTreeMap<String, f64>,

    pub(crate) mics: Vec<Mics>,
    pub(crate) matches: MatchTrack,
    pub(crate) combed_frames: BTreeSet<usize>,
    pub(crate) decimation: DecimationTrack,
    pub(crate) decimate_metrics: Vec<i32>,

    pub(crate) sections: BTreeMap<usize, Section>,
    pub(crate) presets: BTreeMap<String, Preset>,
    pub(crate) custom_lists: Vec<CustomList>,
    pub(crate) freeze_frames: RangeMap<FreezeFrame>,
    pub(crate) bookmarks: BTreeMap<usize, Bookmark>,
    pub(crate) interlaced_fades: BTreeMap<usize, InterlacedFade>,

    pub(crate) pattern_guessing: PatternGuessing,
    pub(crate) ui: UiState,
    pub(crate) resize: Option<Resize>,
    pub(crate) crop: Option<Crop>,
    pub(crate) depth: Option<Depth>,

    observers: Observers,
}

impl Project {
    /// Create a project over the given source and trims.
    ///
    /// The post-source frame count is the total length of the trims, which
    /// must be disjoint and non-empty as a whole. Section 0 is created.
    pub fn new(
        variant: ProjectVariant,
        source: SourceInfo,
        trims: impl IntoIterator<Item = FrameRange>,
    ) -> ProjectResult<Self> {
        let mut trim_map = RangeMap::new();
        for trim in trims {
            trim_map.insert(trim)?;
        }
        if trim_map.is_empty() {
            return Err(ProjectError::invalid_value("trim", "at least one trim is required"));
        }
        let frame_count = trim_map.ranges().map(|r| r.len()).sum();

        let mut sections = BTreeMap::new();
        sections.insert(0, Section::new(0));

        Ok(Self {
            variant,
            source,
            trims: trim_map,
            frame_count,
            vfm_parameters: BTreeMap::new(),
            vdecimate_parameters: BTreeMap::new(),
            mics: Vec::new(),
            matches: MatchTrack::new(frame_count),
            combed_frames: BTreeSet::new(),
            decimation: DecimationTrack::new(frame_count),
            decimate_metrics: Vec::new(),
            sections,
            presets: BTreeMap::new(),
            custom_lists: Vec::new(),
            freeze_frames: RangeMap::new(),
            bookmarks: BTreeMap::new(),
            interlaced_fades: BTreeMap::new(),
            pattern_guessing: PatternGuessing::default(),
            ui: UiState::default(),
            resize: None,
            crop: None,
            depth: None,
            observers: Observers::default(),
        })
    }

    // ---- basic properties ----

    pub fn variant(&self) -> ProjectVariant {
        self.variant
    }

    pub fn is_batch(&self) -> bool {
        self.variant == ProjectVariant::Batch
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    /// Source-frame ranges kept from the input, in ascending order.
    pub fn trims(&self) -> &RangeMap {
        &self.trims
    }

    /// Number of frames after trimming.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Number of frames left after decimation.
    pub fn post_decimation_frame_count(&self) -> usize {
        self.decimation.post_decimation_count()
    }

    pub fn vfm_parameters(&self) -> &BTreeMap<String, f64> {
        &self.vfm_parameters
    }

    pub fn set_vfm_parameter(&mut self, name: impl Into<String>, value: f64) {
        self.vfm_parameters.insert(name.into(), value);
    }

    pub fn vdecimate_parameters(&self) -> &BTreeMap<String, f64> {
        &self.vdecimate_parameters
    }

    pub fn set_vdecimate_parameter(&mut self, name: impl Into<String>, value: f64) {
        self.vdecimate_parameters.insert(name.into(), value);
    }

    pub(crate) fn check_frame(&self, frame: usize) -> ProjectResult<()> {
        if frame >= self.frame_count {
            return Err(ProjectError::frame_out_of_range(frame, self.frame_count));
        }
        Ok(())
    }

    // ---- change notification ----

    /// Register a callback run after every successful mutation.
    pub fn subscribe(&mut self, callback: ChangeCallback) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub(crate) fn notify(&self, event: ProjectEvent) {
        self.observers.notify(&event);
    }

    // ---- metrics ----

    /// Whether mics have been collected.
    pub fn has_mics(&self) -> bool {
        !self.mics.is_empty()
    }

    /// Mics of `frame` in p, c, n, b, u order. All zero until collected.
    pub fn mics(&self, frame: usize) -> ProjectResult<Mics> {
        self.check_frame(frame)?;
        Ok(self.mics.get(frame).copied().unwrap_or_default())
    }

    /// Mic of one match at `frame`.
    pub fn mic(&self, frame: usize, m: Match) -> ProjectResult<i16> {
        Ok(self.mics(frame)?[m.index()])
    }

    pub fn set_mics(&mut self, frame: usize, mics: Mics) -> ProjectResult<()> {
        self.check_frame(frame)?;
        if self.mics.is_empty() {
            self.mics = vec![Mics::default(); self.frame_count];
        }
        self.mics[frame] = mics;
        self.notify(ProjectEvent::MetricsChanged { frame });
        Ok(())
    }

    pub fn has_decimate_metrics(&self) -> bool {
        !self.decimate_metrics.is_empty()
    }

    pub fn decimate_metric(&self, frame: usize) -> ProjectResult<i32> {
        self.check_frame(frame)?;
        Ok(self.decimate_metrics.get(frame).copied().unwrap_or(0))
    }

    pub fn set_decimate_metric(&mut self, frame: usize, metric: i32) -> ProjectResult<()> {
        self.check_frame(frame)?;
        if self.decimate_metrics.is_empty() {
            self.decimate_metrics = vec![0; self.frame_count];
        }
        self.decimate_metrics[frame] = metric;
        self.notify(ProjectEvent::MetricsChanged { frame });
        Ok(())
    }

    // ---- matches ----

    pub fn match_track(&self) -> &MatchTrack {
        &self.matches
    }

    pub fn get_match(&self, frame: usize) -> ProjectResult<Match> {
        self.matches.get(frame)
    }

    pub fn get_original_match(&self, frame: usize) -> ProjectResult<Match> {
        self.matches.get_original(frame)
    }

    pub fn has_original_matches(&self) -> bool {
        self.matches.has_original()
    }

    pub fn set_match(&mut self, frame: usize, m: Match) -> ProjectResult<()> {
        self.matches.set(frame, m)?;
        self.notify(ProjectEvent::MatchesChanged {
            first: frame,
            last: frame,
        });
        Ok(())
    }

    pub fn set_original_match(&mut self, frame: usize, m: Match) -> ProjectResult<()> {
        self.matches.set_original(frame, m)?;
        self.notify(ProjectEvent::MatchesChanged {
            first: frame,
            last: frame,
        });
        Ok(())
    }

    /// Quick `n -> c -> b` toggle. Returns the new match.
    pub fn cycle_match_bcn(&mut self, frame: usize) -> ProjectResult<Match> {
        let m = self.matches.cycle_bcn(frame)?;
        self.notify(ProjectEvent::MatchesChanged {
            first: frame,
            last: frame,
        });
        Ok(m)
    }

    /// Full `u -> b -> n -> c -> p` cycle. Returns the new match.
    pub fn cycle_match(&mut self, frame: usize) -> ProjectResult<Match> {
        let m = self.matches.cycle(frame)?;
        self.notify(ProjectEvent::MatchesChanged {
            first: frame,
            last: frame,
        });
        Ok(m)
    }

    /// Write `pattern[frame % 5]` to every frame of `[first, last]`.
    pub fn set_range_matches_from_pattern(
        &mut self,
        first: usize,
        last: usize,
        pattern: &str,
    ) -> ProjectResult<()> {
        let pattern = parse_match_pattern(pattern)?;
        self.matches.set_range_from_pattern(first, last, &pattern)?;
        self.notify(ProjectEvent::MatchesChanged { first, last });
        Ok(())
    }

    /// Restore the field matcher's decisions in `[first, last]`.
    pub fn reset_range_matches(&mut self, first: usize, last: usize) -> ProjectResult<()> {
        self.matches.reset_range(first, last)?;
        self.notify(ProjectEvent::MatchesChanged { first, last });
        Ok(())
    }

    // ---- decimation ----

    pub fn decimation_track(&self) -> &DecimationTrack {
        &self.decimation
    }

    pub fn add_decimated_frame(&mut self, frame: usize) -> ProjectResult<()> {
        if self.decimation.add(frame)? {
            self.notify(ProjectEvent::DecimationChanged {
                first: frame,
                last: frame,
            });
        }
        Ok(())
    }

    pub fn delete_decimated_frame(&mut self, frame: usize) -> ProjectResult<()> {
        if self.decimation.delete(frame)? {
            self.notify(ProjectEvent::DecimationChanged {
                first: frame,
                last: frame,
            });
        }
        Ok(())
    }

    pub fn is_decimated_frame(&self, frame: usize) -> ProjectResult<bool> {
        self.decimation.is_decimated(frame)
    }

    /// Undrop every frame of the cycle containing `frame`.
    pub fn clear_decimated_frames_from_cycle(&mut self, frame: usize) -> ProjectResult<()> {
        self.decimation.clear_cycle(frame)?;
        let first = frame - frame % CYCLE_LENGTH;
        let last = (first + CYCLE_LENGTH - 1).min(self.frame_count - 1);
        self.notify(ProjectEvent::DecimationChanged { first, last });
        Ok(())
    }

    /// Post-decimation number of a post-source frame.
    pub fn frame_number_after_decimation(&self, frame: usize) -> usize {
        self.decimation.frame_number_after_decimation(frame)
    }

    /// Runs of consecutive cycles dropping the same number of frames.
    pub fn decimation_ranges(&self) -> Vec<DecimationRange> {
        self.decimation.ranges()
    }

    // ---- output settings ----

    pub fn resize(&self) -> Option<&Resize> {
        self.resize.as_ref()
    }

    pub fn set_resize(&mut self, resize: Option<Resize>) {
        self.resize = resize;
        self.notify(ProjectEvent::OutputSettingsChanged);
    }

    pub fn crop(&self) -> Option<&Crop> {
        self.crop.as_ref()
    }

    pub fn set_crop(&mut self, crop: Option<Crop>) {
        self.crop = crop;
        self.notify(ProjectEvent::OutputSettingsChanged);
    }

    pub fn depth(&self) -> Option<&Depth> {
        self.depth.as_ref()
    }

    pub fn set_depth(&mut self, depth: Option<Depth>) {
        self.depth = depth;
        self.notify(ProjectEvent::OutputSettingsChanged);
    }

    // ---- guessing state and ui ----

    /// Parameters and failures of the last pattern guessing run.
    pub fn pattern_guessing(&self) -> &PatternGuessing {
        &self.pattern_guessing
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui
    }

    pub fn ui_state_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }
}
