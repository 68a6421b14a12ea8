//! Project error types.
//!
//! Every variant carries structured fields rather than a pre-formatted
//! message so callers can present them however they like.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::FrameRange;

/// Broad classification of a `ProjectError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Frame or index out of bounds, overlapping or malformed range.
    Range,
    /// Unsafe or duplicate name.
    Name,
    /// Reference to something that does not exist.
    Referential,
    /// Malformed or incomplete persisted document.
    Format,
    /// Reading or writing a file failed.
    Io,
}

/// Errors raised by project operations.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Frame {frame} is out of range (project has {frame_count} frames)")]
    FrameOutOfRange { frame: usize, frame_count: usize },

    #[error("Invalid range {range}: first frame is after last frame")]
    InvalidRange { range: FrameRange },

    #[error("Range {range} overlaps existing range {existing}")]
    Overlap {
        range: FrameRange,
        existing: FrameRange,
    },

    #[error("'{symbol}' is not a valid match")]
    InvalidMatch { symbol: char },

    #[error("Frame {frame} can't have the match '{symbol}'")]
    MatchNotAllowed { frame: usize, symbol: char },

    #[error("Pattern '{pattern}' is invalid: {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },

    #[error("Section starting at frame {start} already exists")]
    SectionExists { start: usize },

    #[error("Section starting at frame 0 can't be deleted")]
    FirstSectionUndeletable,

    #[error("Name '{name}' is invalid: use only letters, digits and underscores, and don't start with a digit")]
    InvalidName { name: String },

    #[error("{what} '{name}' already exists")]
    DuplicateName { what: &'static str, name: String },

    #[error("No section starts at frame {start}")]
    NoSuchSection { start: usize },

    #[error("Preset '{name}' does not exist")]
    NoSuchPreset { name: String },

    #[error("Custom list '{name}' does not exist")]
    NoSuchCustomList { name: String },

    #[error("Custom list index {index} is out of range ({count} lists)")]
    CustomListIndexOutOfRange { index: usize, count: usize },

    #[error("No {what} starts at frame {frame}")]
    NoSuchEntry { what: &'static str, frame: usize },

    #[error("Section {section} has no preset at position {index}")]
    PresetIndexOutOfRange { section: usize, index: usize },

    #[error("The project has no {what}")]
    MissingMetrics { what: &'static str },

    #[error("Project is missing required key '{key}'")]
    MissingKey { key: &'static str },

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Malformed project document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ProjectError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FrameOutOfRange { .. }
            | Self::InvalidRange { .. }
            | Self::Overlap { .. }
            | Self::InvalidMatch { .. }
            | Self::MatchNotAllowed { .. }
            | Self::InvalidPattern { .. }
            | Self::SectionExists { .. }
            | Self::FirstSectionUndeletable
            | Self::CustomListIndexOutOfRange { .. }
            | Self::PresetIndexOutOfRange { .. } => ErrorKind::Range,
            Self::InvalidName { .. } | Self::DuplicateName { .. } => ErrorKind::Name,
            Self::NoSuchSection { .. }
            | Self::NoSuchPreset { .. }
            | Self::NoSuchCustomList { .. }
            | Self::NoSuchEntry { .. }
            | Self::MissingMetrics { .. } => ErrorKind::Referential,
            Self::MissingKey { .. } | Self::InvalidValue { .. } | Self::Json(_) => {
                ErrorKind::Format
            }
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// Create a frame out of range error.
    pub fn frame_out_of_range(frame: usize, frame_count: usize) -> Self {
        Self::FrameOutOfRange { frame, frame_count }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    /// Create a duplicate name error.
    pub fn duplicate_name(what: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            what,
            name: name.into(),
        }
    }

    /// Create a missing preset error.
    pub fn no_such_preset(name: impl Into<String>) -> Self {
        Self::NoSuchPreset { name: name.into() }
    }

    /// Create a missing custom list error.
    pub fn no_such_custom_list(name: impl Into<String>) -> Self {
        Self::NoSuchCustomList { name: name.into() }
    }

    /// Create an invalid value error for a document key.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with the path involved.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;
