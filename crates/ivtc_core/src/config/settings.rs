//! Settings struct with TOML-based sections.
//!
//! Each section maps to one TOML table and can be written back on its own.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::models::{DropDuplicate, GuessingMethod, GuessingParams, PatternSet, ThirdNMatch};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    /// Defaults for pattern guessing runs.
    #[serde(default)]
    pub guessing: GuessingSettings,

    /// Script generation options.
    #[serde(default)]
    pub script: ScriptSettings,
}

/// Folders the tool reads from and writes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Folder of the last opened project.
    #[serde(default)]
    pub last_project_dir: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            logs_folder: default_logs_folder(),
            last_project_dir: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Level used when `RUST_LOG` is not set.
    #[serde(default)]
    pub level: LogLevel,

    /// Also write `ivtc.log` into the logs folder.
    #[serde(default = "default_true")]
    pub log_to_file: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            log_to_file: true,
        }
    }
}

/// Pattern guessing defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessingSettings {
    #[serde(default)]
    pub method: GuessingMethod,

    #[serde(default = "default_minimum_length")]
    pub minimum_length: usize,

    #[serde(default)]
    pub third_n_match: ThirdNMatch,

    #[serde(default)]
    pub decimation: DropDuplicate,

    /// Bitmask of candidate patterns: 1 = cccnn, 2 = ccnnn, 4 = ccccc.
    #[serde(default = "default_use_patterns")]
    pub use_patterns: u32,
}

fn default_minimum_length() -> usize {
    10
}

fn default_use_patterns() -> u32 {
    PatternSet::ALL.bits()
}

impl Default for GuessingSettings {
    fn default() -> Self {
        Self {
            method: GuessingMethod::default(),
            minimum_length: default_minimum_length(),
            third_n_match: ThirdNMatch::default(),
            decimation: DropDuplicate::default(),
            use_patterns: default_use_patterns(),
        }
    }
}

impl GuessingSettings {
    /// Parameters for a guessing run.
    pub fn to_params(&self) -> GuessingParams {
        GuessingParams {
            method: self.method,
            minimum_length: self.minimum_length,
            third_n_match: self.third_n_match,
            decimation: self.decimation,
            use_patterns: PatternSet::from_bits(self.use_patterns),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSettings {
    /// Start scripts with a comment naming the generator version and time.
    #[serde(default = "default_true")]
    pub header_comment: bool,

    /// Decimate with `SelectEvery` even when `DeleteFrames` would be shorter.
    #[serde(default)]
    pub prefer_select_every: bool,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            header_comment: true,
            prefer_select_every: false,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Guessing,
    Script,
}

impl ConfigSection {
    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Guessing => "guessing",
            ConfigSection::Script => "script",
        }
    }

    /// Get all sections in file order.
    pub fn all() -> &'static [ConfigSection] {
        &[
            ConfigSection::Paths,
            ConfigSection::Logging,
            ConfigSection::Guessing,
            ConfigSection::Script,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[guessing]"));
        assert!(toml.contains("method = \"from_matches\""));
        assert!(toml.contains("decimation = \"first_duplicate\""));
    }

    #[test]
    fn settings_round_trip() {
        let mut settings = Settings::default();
        settings.guessing.third_n_match = ThirdNMatch::IfPrettier;
        settings.logging.level = LogLevel::Debug;
        let toml = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[guessing]\nminimum_length = 25";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.guessing.minimum_length, 25);
        assert_eq!(parsed.guessing.use_patterns, 7);
        assert!(parsed.script.header_comment);
        assert_eq!(parsed.paths.logs_folder, ".logs");
    }

    #[test]
    fn guessing_settings_become_params() {
        let settings = GuessingSettings {
            method: GuessingMethod::FromMics,
            use_patterns: 0b101,
            ..Default::default()
        };
        let params = settings.to_params();
        assert_eq!(params.method, GuessingMethod::FromMics);
        assert!(params.use_patterns.contains(PatternSet::CCCCC));
        assert!(!params.use_patterns.contains(PatternSet::CCNNN));
    }
}
