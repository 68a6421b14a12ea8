//! Data models for inverse-telecine projects.
//!
//! This module contains the plain value types used throughout the crate:
//! - Enums for match symbols, filter positions and guessing policies
//! - Frame ranges and per-frame metric types
//! - Registry entities (sections, presets, freeze frames, bookmarks...)
//! - Pattern guessing parameters and failure ledger

mod entities;
mod enums;
mod frames;
mod guessing;

pub use entities::{
    Bookmark, Crop, Depth, FreezeFrame, InterlacedFade, Preset, Resize, Section, SourceInfo,
    UiState,
};
pub use enums::{
    DropDuplicate, FilterPosition, GuessFailureReason, GuessingMethod, Match, ProjectVariant,
    ThirdNMatch,
};
pub use frames::{DecimationRange, FrameRange, Mics, Ranged};
pub use guessing::{GuessingParams, PatternGuessing, PatternSet};
