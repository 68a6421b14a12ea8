//! Plain entities stored by the project registries.

use serde::{Deserialize, Serialize};

use super::frames::{FrameRange, Ranged};

/// Where the source comes from and what it looks like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Path of the input video.
    pub input_file: String,
    /// Frame rate numerator.
    pub fps_num: i64,
    /// Frame rate denominator.
    pub fps_den: i64,
    pub width: u32,
    pub height: u32,
    /// Source filter invoked by the generated script (e.g. `d2v.Source`).
    pub source_filter: String,
}

impl SourceInfo {
    /// Frame rate as a float.
    pub fn fps(&self) -> f64 {
        if self.fps_den == 0 {
            return 0.0;
        }
        self.fps_num as f64 / self.fps_den as f64
    }
}

/// Contiguous run of frames sharing an ordered list of presets.
///
/// A section ends where the next one starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub start: usize,
    pub presets: Vec<String>,
}

impl Section {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            presets: Vec::new(),
        }
    }
}

/// Range of frames all replaced by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeFrame {
    pub first: usize,
    pub last: usize,
    pub replacement: usize,
}

impl Ranged for FreezeFrame {
    fn frame_range(&self) -> FrameRange {
        FrameRange::new(self.first, self.last)
    }
}

/// Named fragment of script logic applied to a clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub contents: String,
}

/// Annotation attached to one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub frame: usize,
    pub description: String,
}

/// Frame detected as part of an interlaced fade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterlacedFade {
    pub frame: usize,
    /// Difference between the average values of the two fields.
    pub field_difference: f64,
}

/// Final resize applied by the generated script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
    /// Resizer kernel name (`bicubic`, `spline36`...).
    pub filter: String,
}

/// Crop applied either right after the source or at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Crop {
    /// Crop right after loading the source instead of at the end.
    pub early: bool,
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Output bit depth conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depth {
    pub bits: u32,
    pub float_samples: bool,
    /// Dither type passed to the resizer (`none`, `ordered`, `random`, `error_diffusion`).
    pub dither: String,
}

/// Interactive-only state persisted with the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    pub zoom: u32,
    pub last_visited_frame: usize,
    pub geometry: String,
    pub state: String,
    /// Frame rates highlighted in the frame-rate display.
    pub shown_frame_rates: Vec<u32>,
    /// Minimum mic reported by the "next high mic" search.
    pub mic_search_minimum: u32,
    /// Minimum length of the `c` match runs the search reports.
    pub c_match_sequences_minimum: u32,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            zoom: 1,
            last_visited_frame: 0,
            geometry: String::new(),
            state: String::new(),
            shown_frame_rates: vec![30, 24, 18, 12, 6],
            mic_search_minimum: 20,
            c_match_sequences_minimum: 20,
        }
    }
}
