//! Pattern guessing configuration and failure ledger.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::{DropDuplicate, GuessFailureReason, GuessingMethod, ThirdNMatch};

/// Set of candidate patterns the mics guesser may pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternSet(u32);

impl PatternSet {
    /// 3:2 pulldown with two `n` matches per cycle.
    pub const CCCNN: PatternSet = PatternSet(1 << 0);
    /// 3:2 pulldown with three `n` matches per cycle.
    pub const CCNNN: PatternSet = PatternSet(1 << 1);
    /// No pulldown at all.
    pub const CCCCC: PatternSet = PatternSet(1 << 2);
    pub const ALL: PatternSet = PatternSet(0b111);
    pub const NONE: PatternSet = PatternSet(0);

    /// Build from a raw bitmask; unknown bits are dropped.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: PatternSet) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::ops::BitOr for PatternSet {
    type Output = PatternSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        PatternSet(self.0 | rhs.0)
    }
}

/// Parameters of one guessing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessingParams {
    #[serde(default)]
    pub method: GuessingMethod,

    /// Sections shorter than this are skipped.
    #[serde(default = "default_minimum_length")]
    pub minimum_length: usize,

    /// Only used when guessing from matches.
    #[serde(default)]
    pub third_n_match: ThirdNMatch,

    #[serde(default)]
    pub decimation: DropDuplicate,

    /// Only used when guessing from mics.
    #[serde(default)]
    pub use_patterns: PatternSet,
}

fn default_minimum_length() -> usize {
    10
}

impl Default for GuessingParams {
    fn default() -> Self {
        Self {
            method: GuessingMethod::default(),
            minimum_length: default_minimum_length(),
            third_n_match: ThirdNMatch::default(),
            decimation: DropDuplicate::default(),
            use_patterns: PatternSet::default(),
        }
    }
}

/// Last run's parameters plus the sections it failed on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternGuessing {
    pub params: GuessingParams,
    /// Section start -> reason.
    pub failures: BTreeMap<usize, GuessFailureReason>,
}

impl PatternGuessing {
    /// Whether the last run failed on the section starting at `start`.
    pub fn failed(&self, start: usize) -> Option<GuessFailureReason> {
        self.failures.get(&start).copied()
    }
}
