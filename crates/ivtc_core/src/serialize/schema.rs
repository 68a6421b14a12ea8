//! On-disk shape of a project document.
//!
//! Keys are the human-readable names used by the project file format. These
//! types only describe the JSON; converting to and from [`Project`] lives in
//! `project_file`.
//!
//! [`Project`]: crate::project::Project

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Match, Mics, Preset, Section};

/// Current project format version.
pub const PROJECT_FORMAT_VERSION: u32 = 2;

/// Keys every project document must carry.
pub const REQUIRED_KEYS: [&str; 5] = [
    "input file",
    "input frame rate",
    "input resolution",
    "trim",
    "source filter",
];

fn default_version() -> u32 {
    PROJECT_FORMAT_VERSION
}

/// Whole project document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(rename = "project format version", default = "default_version")]
    pub version: u32,

    #[serde(rename = "input file")]
    pub input_file: String,

    #[serde(rename = "input frame rate")]
    pub input_frame_rate: [i64; 2],

    #[serde(rename = "input resolution")]
    pub input_resolution: [u32; 2],

    pub trim: Vec<[usize; 2]>,

    #[serde(rename = "source filter")]
    pub source_filter: String,

    #[serde(rename = "vfm parameters", default)]
    pub vfm_parameters: BTreeMap<String, serde_json::Number>,

    #[serde(rename = "vdecimate parameters", default)]
    pub vdecimate_parameters: BTreeMap<String, serde_json::Number>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mics: Vec<Mics>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<Match>,

    #[serde(
        rename = "original matches",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub original_matches: Vec<Match>,

    #[serde(rename = "combed frames", default)]
    pub combed_frames: Vec<usize>,

    #[serde(rename = "decimated frames", default)]
    pub decimated_frames: Vec<usize>,

    #[serde(
        rename = "decimate metrics",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub decimate_metrics: Vec<i32>,

    #[serde(default)]
    pub sections: Vec<Section>,

    #[serde(rename = "interlaced fades", default)]
    pub interlaced_fades: Vec<InterlacedFadeEntry>,

    // Interactive projects only.
    #[serde(rename = "user interface", default, skip_serializing_if = "Option::is_none")]
    pub user_interface: Option<UserInterfaceEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presets: Option<Vec<Preset>>,

    #[serde(rename = "frozen frames", default, skip_serializing_if = "Option::is_none")]
    pub frozen_frames: Option<Vec<[usize; 3]>>,

    #[serde(rename = "custom lists", default, skip_serializing_if = "Option::is_none")]
    pub custom_lists: Option<Vec<CustomListEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarks: Option<Vec<BookmarkEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<ResizeEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<DepthEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterlacedFadeEntry {
    pub frame: usize,
    #[serde(rename = "field difference")]
    pub field_difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomListEntry {
    pub name: String,
    #[serde(default)]
    pub preset: String,
    /// Filter position name, e.g. `"post field match"`.
    pub position: String,
    #[serde(default)]
    pub frames: Vec<[usize; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub frame: usize,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeEntry {
    pub width: u32,
    pub height: u32,
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropEntry {
    #[serde(default)]
    pub early: bool,
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthEntry {
    pub bits: u32,
    #[serde(rename = "float samples", default)]
    pub float_samples: bool,
    pub dither: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInterfaceEntry {
    #[serde(default = "default_zoom")]
    pub zoom: u32,

    #[serde(rename = "last visited frame", default)]
    pub last_visited_frame: usize,

    #[serde(default)]
    pub geometry: String,

    #[serde(default)]
    pub state: String,

    #[serde(rename = "show frame rates", default = "default_shown_rates")]
    pub shown_frame_rates: Vec<u32>,

    #[serde(rename = "mic search minimum", default = "default_search_minimum")]
    pub mic_search_minimum: u32,

    #[serde(rename = "c match sequences minimum", default = "default_search_minimum")]
    pub c_match_sequences_minimum: u32,

    #[serde(rename = "pattern guessing", default)]
    pub pattern_guessing: PatternGuessingEntry,
}

fn default_zoom() -> u32 {
    1
}

fn default_shown_rates() -> Vec<u32> {
    vec![30, 24, 18, 12, 6]
}

fn default_search_minimum() -> u32 {
    20
}

/// Guessing parameters and failures, with policies stored by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternGuessingEntry {
    #[serde(default = "default_method")]
    pub method: String,

    #[serde(rename = "minimum length", default = "default_minimum_length")]
    pub minimum_length: usize,

    #[serde(rename = "third n match", default = "default_third_n_match")]
    pub third_n_match: String,

    #[serde(default = "default_decimation")]
    pub decimation: String,

    #[serde(rename = "use patterns", default = "default_use_patterns")]
    pub use_patterns: u32,

    #[serde(default)]
    pub failures: Vec<FailureEntry>,
}

fn default_method() -> String {
    "from matches".to_string()
}

fn default_minimum_length() -> usize {
    10
}

fn default_third_n_match() -> String {
    "never".to_string()
}

fn default_decimation() -> String {
    "first duplicate".to_string()
}

fn default_use_patterns() -> u32 {
    7
}

impl Default for PatternGuessingEntry {
    fn default() -> Self {
        Self {
            method: default_method(),
            minimum_length: default_minimum_length(),
            third_n_match: default_third_n_match(),
            decimation: default_decimation(),
            use_patterns: default_use_patterns(),
            failures: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub start: usize,
    pub reason: String,
}
