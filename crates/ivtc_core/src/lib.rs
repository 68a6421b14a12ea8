//! ivtc core - project model and automation for inverse telecine
//!
//! This crate contains the per-frame match and decimation decisions of a
//! source video, the registries built around them, the pattern guesser that
//! fills them in automatically, and the serializers that turn a project
//! into a project file, a VapourSynth script or a timecodes file.
//! It has no UI dependencies and is driven by the `ivtc` CLI.

pub mod config;
pub mod guessing;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod project;
pub mod serialize;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
