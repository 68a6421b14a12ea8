//! Subcommand implementations.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use ivtc_core::config::Settings;
use ivtc_core::models::GuessingParams;
use ivtc_core::project::Project;
use ivtc_core::serialize::{load_project, save_project, timecodes_v1, ScriptGenerator};

use crate::cli::GuessArgs;

fn load(path: &Path) -> Result<Project> {
    load_project(path).with_context(|| format!("Failed to load project {}", path.display()))
}

/// Write to `output`, or stdout when there is none.
fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => io::stdout()
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?,
    }
    Ok(())
}

/// Human-readable summary of a project.
pub fn describe(project: &Project) -> String {
    let source = project.source();
    let mut out = String::new();

    let _ = writeln!(out, "Input:        {}", source.input_file);
    let _ = writeln!(
        out,
        "Frame rate:   {}/{} ({:.3} fps)",
        source.fps_num,
        source.fps_den,
        source.fps()
    );
    let _ = writeln!(out, "Resolution:   {}x{}", source.width, source.height);
    let _ = writeln!(out, "Frames:       {}", project.frame_count());
    let _ = writeln!(out, "Decimated:    {}", project.post_decimation_frame_count());
    let _ = writeln!(out, "Sections:     {}", project.section_count());

    for section in project.sections() {
        let end = project.section_end(section.start).unwrap_or(section.start);
        let mut line = format!("  {:>7} - {:<7}", section.start, end.saturating_sub(1));
        if !section.presets.is_empty() {
            let _ = write!(line, " presets: {}", section.presets.join(", "));
        }
        if let Some(reason) = project.pattern_guessing().failed(section.start) {
            let _ = write!(line, " [guessing failed: {}]", reason);
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }

    let lists = project.custom_lists();
    if !lists.is_empty() {
        let _ = writeln!(out, "Custom lists: {}", lists.len());
        for list in lists {
            let _ = writeln!(
                out,
                "  {} ({}, {} ranges)",
                list.name,
                list.position,
                list.ranges.len()
            );
        }
    }
    out
}

pub fn info(path: &Path) -> Result<()> {
    let project = load(path)?;
    print!("{}", describe(&project));
    Ok(())
}

/// Settings defaults overridden by whatever was given on the command line.
pub fn guessing_params(settings: &Settings, args: &GuessArgs) -> GuessingParams {
    let mut params = settings.guessing.to_params();
    if let Some(method) = args.method {
        params.method = method.into();
    }
    if let Some(minimum_length) = args.minimum_length {
        params.minimum_length = minimum_length;
    }
    if let Some(third_n_match) = args.third_n_match {
        params.third_n_match = third_n_match.into();
    }
    if let Some(decimation) = args.decimation {
        params.decimation = decimation.into();
    }
    params
}

pub fn guess(settings: &Settings, args: &GuessArgs) -> Result<()> {
    let mut project = load(&args.project)?;
    let params = guessing_params(settings, args);

    let summary = project
        .guess_project_patterns(&params)
        .context("Pattern guessing failed")?;
    println!("{}", summary);
    for (start, reason) in &summary.failures {
        println!("  section {}: {}", start, reason);
    }

    let output = args.output.as_deref().unwrap_or(&args.project);
    save_project(&project, output)
        .with_context(|| format!("Failed to save project {}", output.display()))?;
    Ok(())
}

pub fn script(settings: &Settings, path: &Path, output: Option<&Path>) -> Result<()> {
    let project = load(path)?;
    let script = ScriptGenerator::from_settings(&project, &settings.script).generate();
    emit(&script, output)
}

pub fn timecodes(path: &Path, output: Option<&Path>) -> Result<()> {
    let project = load(path)?;
    emit(&timecodes_v1(&project), output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{DecimationArg, MethodArg};
    use ivtc_core::models::{
        DropDuplicate, FrameRange, GuessingMethod, ProjectVariant, SourceInfo,
    };
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn sample_project() -> Project {
        let source = SourceInfo {
            input_file: "ep1.d2v".to_string(),
            fps_num: 30000,
            fps_den: 1001,
            width: 720,
            height: 480,
            source_filter: "d2v.Source".to_string(),
        };
        let mut project =
            Project::new(ProjectVariant::Interactive, source, [FrameRange::new(0, 49)]).unwrap();
        for frame in 0..50 {
            // n right before every seam at cycle position 3
            let m = if frame % 5 == 3 {
                ivtc_core::models::Match::N
            } else {
                ivtc_core::models::Match::C
            };
            project.set_original_match(frame, m).unwrap();
        }
        project.add_section(30).unwrap();
        project
    }

    fn guess_args(project: PathBuf) -> GuessArgs {
        GuessArgs {
            project,
            method: None,
            minimum_length: None,
            third_n_match: None,
            decimation: None,
            output: None,
        }
    }

    #[test]
    fn flags_override_settings() {
        let settings = Settings::default();
        let mut args = guess_args(PathBuf::from("a.json"));
        assert_eq!(guessing_params(&settings, &args), settings.guessing.to_params());

        args.method = Some(MethodArg::Mics);
        args.decimation = Some(DecimationArg::Second);
        args.minimum_length = Some(3);
        let params = guessing_params(&settings, &args);
        assert_eq!(params.method, GuessingMethod::FromMics);
        assert_eq!(params.decimation, DropDuplicate::SecondDuplicate);
        assert_eq!(params.minimum_length, 3);
    }

    #[test]
    fn guess_saves_next_to_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ep1.json");
        let output = dir.path().join("ep1.guessed.json");
        save_project(&sample_project(), &input).unwrap();

        let mut args = guess_args(input.clone());
        args.output = Some(output.clone());
        guess(&Settings::default(), &args).unwrap();

        let guessed = load_project(&output).unwrap();
        assert_eq!(guessed.post_decimation_frame_count(), 40);
        assert!(guessed.pattern_guessing().failures.is_empty());
        // The input stays untouched.
        assert_eq!(load_project(&input).unwrap().post_decimation_frame_count(), 50);
    }

    #[test]
    fn script_and_timecodes_write_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ep1.json");
        save_project(&sample_project(), &input).unwrap();

        let script_path = dir.path().join("ep1.vpy");
        script(&Settings::default(), &input, Some(&script_path)).unwrap();
        let text = fs::read_to_string(&script_path).unwrap();
        assert!(text.contains("src = c.d2v.Source('ep1.d2v')"));
        assert!(text.trim_end().ends_with("src.set_output()"));

        let timecodes_path = dir.path().join("ep1.tc.txt");
        timecodes(&input, Some(&timecodes_path)).unwrap();
        let text = fs::read_to_string(&timecodes_path).unwrap();
        assert!(text.starts_with("# timecode format v1\n"));
    }

    #[test]
    fn describe_lists_sections() {
        let text = describe(&sample_project());
        assert!(text.contains("Frames:       50"));
        assert!(text.contains("Sections:     2"));
        assert!(text.contains("       30 - 49"));
    }

    #[test]
    fn missing_project_reports_path() {
        let err = info(Path::new("/nonexistent/ep9.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("ep9.json"));
    }
}
