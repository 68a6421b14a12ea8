//! Core enums used throughout the project model.

use serde::{Deserialize, Serialize};

/// Field-matching decision for one source frame.
///
/// The declaration order is also the index order of a frame's mics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Match {
    /// Match with the previous field.
    P,
    /// Match with the current field.
    #[default]
    C,
    /// Match with the next field.
    N,
    /// Previous field, opposite parity.
    B,
    /// Next field, opposite parity.
    U,
}

impl Match {
    /// Get all match symbols in mics index order.
    pub fn all() -> &'static [Match] {
        &[Self::P, Self::C, Self::N, Self::B, Self::U]
    }

    /// Single-character symbol used in project files and scripts.
    pub fn as_char(&self) -> char {
        match self {
            Self::P => 'p',
            Self::C => 'c',
            Self::N => 'n',
            Self::B => 'b',
            Self::U => 'u',
        }
    }

    /// Parse a match symbol. Returns None for anything outside {p,c,n,b,u}.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'p' => Some(Self::P),
            'c' => Some(Self::C),
            'n' => Some(Self::N),
            'b' => Some(Self::B),
            'u' => Some(Self::U),
            _ => None,
        }
    }

    /// Index of this match in a frame's mics array.
    pub fn index(&self) -> usize {
        match self {
            Self::P => 0,
            Self::C => 1,
            Self::N => 2,
            Self::B => 3,
            Self::U => 4,
        }
    }

    /// Whether the match needs a field from the previous frame.
    pub fn needs_previous(&self) -> bool {
        matches!(self, Self::P | Self::B)
    }

    /// Whether the match needs a field from the next frame.
    pub fn needs_next(&self) -> bool {
        matches!(self, Self::N | Self::U)
    }
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Pipeline stage at which a custom list's preset is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPosition {
    /// Right after the source is loaded and trimmed.
    PostSource,
    /// After field matching.
    #[default]
    PostFieldMatch,
    /// After decimation. Ranges are translated to post-decimation numbering.
    PostDecimate,
}

impl FilterPosition {
    /// Name used in project files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PostSource => "post source",
            Self::PostFieldMatch => "post field match",
            Self::PostDecimate => "post decimate",
        }
    }

    /// Parse the project-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.name() == name)
    }

    /// Get all positions in pipeline order.
    pub fn all() -> &'static [FilterPosition] {
        &[Self::PostSource, Self::PostFieldMatch, Self::PostDecimate]
    }
}

impl std::fmt::Display for FilterPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which input the pattern guesser classifies from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessingMethod {
    /// Use the matches detected by the field matcher.
    #[default]
    FromMatches,
    /// Use the per-frame mics.
    FromMics,
}

impl GuessingMethod {
    /// Name used in project files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FromMatches => "from matches",
            Self::FromMics => "from mics",
        }
    }

    /// Parse the project-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::FromMatches, Self::FromMics]
            .into_iter()
            .find(|m| m.name() == name)
    }
}

impl std::fmt::Display for GuessingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Policy for the optional third `n` match when guessing from matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThirdNMatch {
    /// Always promote the `c` before the pair of `n` matches.
    Always,
    /// Never promote it.
    #[default]
    Never,
    /// Promote it only where the `n` mic is lower than the `c` mic.
    IfPrettier,
}

impl ThirdNMatch {
    /// Name used in project files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Never => "never",
            Self::IfPrettier => "if it has lower mic",
        }
    }

    /// Parse the project-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Always, Self::Never, Self::IfPrettier]
            .into_iter()
            .find(|t| t.name() == name)
    }
}

/// Which of the two duplicate frames in a cycle gets dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropDuplicate {
    /// Always drop the first duplicate.
    #[default]
    FirstDuplicate,
    /// Always drop the second duplicate.
    SecondDuplicate,
    /// Drop the one with the higher mic, decided per cycle.
    UglierPerCycle,
    /// Drop the one with the higher mic more often, decided once per section.
    UglierPerSection,
}

impl DropDuplicate {
    /// Name used in project files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstDuplicate => "first duplicate",
            Self::SecondDuplicate => "second duplicate",
            Self::UglierPerCycle => "duplicate with higher mic per cycle",
            Self::UglierPerSection => "duplicate with higher mic per section",
        }
    }

    /// Parse the project-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::FirstDuplicate,
            Self::SecondDuplicate,
            Self::UglierPerCycle,
            Self::UglierPerSection,
        ]
        .into_iter()
        .find(|d| d.name() == name)
    }
}

/// Why the guesser left a section untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessFailureReason {
    /// Section is shorter than the configured minimum length.
    SectionTooShort,
    /// No candidate pattern was clearly better than the others.
    AmbiguousPattern,
}

impl GuessFailureReason {
    /// Name used in project files and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SectionTooShort => "section too short",
            Self::AmbiguousPattern => "ambiguous pattern",
        }
    }

    /// Parse the project-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::SectionTooShort, Self::AmbiguousPattern]
            .into_iter()
            .find(|r| r.name() == name)
    }
}

impl std::fmt::Display for GuessFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Which flavour of project file is produced.
///
/// Batch projects come straight from the metrics collector and carry no
/// interactive state (presets, custom lists, UI settings...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectVariant {
    #[default]
    Interactive,
    Batch,
}
