//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use ivtc_core::models::{DropDuplicate, GuessingMethod, ThirdNMatch};

/// Batch driver for inverse-telecine projects.
#[derive(Parser, Debug)]
#[command(name = "ivtc", version, about, long_about = None)]
pub struct Cli {
    /// Settings file, created with defaults if missing
    #[arg(long, global = true, default_value = ".config/settings.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show frame counts, sections and guessing failures of a project
    Info {
        project: PathBuf,
    },

    /// Guess match and decimation patterns of every section
    Guess(GuessArgs),

    /// Write the VapourSynth script of a project
    Script {
        project: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write timecodes v1 for the decimated output
    Timecodes {
        project: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct GuessArgs {
    pub project: PathBuf,

    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// Sections shorter than this are skipped
    #[arg(long)]
    pub minimum_length: Option<usize>,

    #[arg(long, value_enum)]
    pub third_n_match: Option<ThirdNArg>,

    /// Which duplicate of each cycle to drop
    #[arg(long, value_enum)]
    pub decimation: Option<DecimationArg>,

    /// Where to save the guessed project (overwrites the input if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodArg {
    Mics,
    Matches,
}

impl From<MethodArg> for GuessingMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Mics => GuessingMethod::FromMics,
            MethodArg::Matches => GuessingMethod::FromMatches,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThirdNArg {
    Always,
    Never,
    IfPrettier,
}

impl From<ThirdNArg> for ThirdNMatch {
    fn from(arg: ThirdNArg) -> Self {
        match arg {
            ThirdNArg::Always => ThirdNMatch::Always,
            ThirdNArg::Never => ThirdNMatch::Never,
            ThirdNArg::IfPrettier => ThirdNMatch::IfPrettier,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimationArg {
    /// Always the first duplicate
    First,
    /// Always the second duplicate
    Second,
    /// The one with the higher mic, per cycle
    Cycle,
    /// The one with the higher mic more often, per section
    Section,
}

impl From<DecimationArg> for DropDuplicate {
    fn from(arg: DecimationArg) -> Self {
        match arg {
            DecimationArg::First => DropDuplicate::FirstDuplicate,
            DecimationArg::Second => DropDuplicate::SecondDuplicate,
            DecimationArg::Cycle => DropDuplicate::UglierPerCycle,
            DecimationArg::Section => DropDuplicate::UglierPerSection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_flags_parse() {
        let cli = Cli::try_parse_from([
            "ivtc",
            "guess",
            "ep1.json",
            "--method",
            "mics",
            "--third-n-match",
            "if-prettier",
            "--decimation",
            "cycle",
            "--minimum-length",
            "25",
        ])
        .unwrap();

        let Command::Guess(args) = cli.command else {
            panic!("expected guess");
        };
        assert_eq!(args.project, PathBuf::from("ep1.json"));
        assert_eq!(args.method, Some(MethodArg::Mics));
        assert_eq!(args.third_n_match, Some(ThirdNArg::IfPrettier));
        assert_eq!(
            DropDuplicate::from(args.decimation.unwrap()),
            DropDuplicate::UglierPerCycle
        );
        assert_eq!(args.minimum_length, Some(25));
        assert_eq!(args.output, None);
    }

    #[test]
    fn config_is_global() {
        let cli = Cli::try_parse_from(["ivtc", "script", "a.json", "--config", "my.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("my.toml"));
        assert!(matches!(cli.command, Command::Script { output: None, .. }));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(Cli::try_parse_from(["ivtc", "guess", "a.json", "--decimation", "third"]).is_err());
    }
}
