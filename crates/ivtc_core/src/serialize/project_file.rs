//! Reading and writing project documents.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::schema::{
    BookmarkEntry, CropEntry, CustomListEntry, DepthEntry, FailureEntry, InterlacedFadeEntry,
    PatternGuessingEntry, ProjectDocument, ResizeEntry, UserInterfaceEntry,
    PROJECT_FORMAT_VERSION, REQUIRED_KEYS,
};
use crate::models::{
    Crop, Depth, DropDuplicate, FilterPosition, FrameRange, GuessFailureReason, GuessingMethod,
    GuessingParams, PatternGuessing, PatternSet, ProjectVariant, Resize, Section, SourceInfo,
    ThirdNMatch, UiState,
};
use crate::project::{MatchTrack, Project, ProjectError, ProjectResult};

/// Parameter value as JSON, integers without a fractional part.
fn number_from_f64(value: f64) -> serde_json::Number {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serde_json::Number::from(value as i64)
    } else {
        serde_json::Number::from_f64(value).unwrap_or_else(|| serde_json::Number::from(0))
    }
}

fn parameters_to_json(params: &BTreeMap<String, f64>) -> BTreeMap<String, serde_json::Number> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), number_from_f64(*v)))
        .collect()
}

fn parameters_from_json(
    key: &str,
    params: BTreeMap<String, serde_json::Number>,
) -> ProjectResult<BTreeMap<String, f64>> {
    params
        .into_iter()
        .map(|(name, number)| {
            number
                .as_f64()
                .map(|v| (name.clone(), v))
                .ok_or_else(|| ProjectError::invalid_value(key, format!("'{name}' is not a number")))
        })
        .collect()
}

/// Parse a policy stored by name.
fn by_name<T>(key: &str, name: &str, parse: impl Fn(&str) -> Option<T>) -> ProjectResult<T> {
    parse(name).ok_or_else(|| ProjectError::invalid_value(key, format!("unknown value '{name}'")))
}

fn guessing_to_entry(guessing: &PatternGuessing) -> PatternGuessingEntry {
    let params = &guessing.params;
    PatternGuessingEntry {
        method: params.method.name().to_string(),
        minimum_length: params.minimum_length,
        third_n_match: params.third_n_match.name().to_string(),
        decimation: params.decimation.name().to_string(),
        use_patterns: params.use_patterns.bits(),
        failures: guessing
            .failures
            .iter()
            .map(|(&start, reason)| FailureEntry {
                start,
                reason: reason.name().to_string(),
            })
            .collect(),
    }
}

fn guessing_from_entry(entry: &PatternGuessingEntry) -> ProjectResult<PatternGuessing> {
    let params = GuessingParams {
        method: by_name("method", &entry.method, GuessingMethod::from_name)?,
        minimum_length: entry.minimum_length,
        third_n_match: by_name("third n match", &entry.third_n_match, ThirdNMatch::from_name)?,
        decimation: by_name("decimation", &entry.decimation, DropDuplicate::from_name)?,
        use_patterns: PatternSet::from_bits(entry.use_patterns),
    };
    let failures = entry
        .failures
        .iter()
        .map(|f| -> ProjectResult<(usize, GuessFailureReason)> {
            Ok((f.start, by_name("failures", &f.reason, GuessFailureReason::from_name)?))
        })
        .collect::<ProjectResult<_>>()?;
    Ok(PatternGuessing { params, failures })
}

fn to_document(project: &Project) -> ProjectDocument {
    let source = project.source();
    let interactive = !project.is_batch();
    // Batch documents carry the interactive registries only when they hold
    // something, so section preset references always resolve on reload.
    let written = |empty: bool| interactive || !empty;

    let user_interface = interactive.then(|| {
        let ui = project.ui_state();
        UserInterfaceEntry {
            zoom: ui.zoom,
            last_visited_frame: ui.last_visited_frame,
            geometry: ui.geometry.clone(),
            state: ui.state.clone(),
            shown_frame_rates: ui.shown_frame_rates.clone(),
            mic_search_minimum: ui.mic_search_minimum,
            c_match_sequences_minimum: ui.c_match_sequences_minimum,
            pattern_guessing: guessing_to_entry(project.pattern_guessing()),
        }
    });

    ProjectDocument {
        version: PROJECT_FORMAT_VERSION,
        input_file: source.input_file.clone(),
        input_frame_rate: [source.fps_num, source.fps_den],
        input_resolution: [source.width, source.height],
        trim: project.trims().ranges().map(|r| [r.first, r.last]).collect(),
        source_filter: source.source_filter.clone(),
        vfm_parameters: parameters_to_json(project.vfm_parameters()),
        vdecimate_parameters: parameters_to_json(project.vdecimate_parameters()),
        mics: project.mics.clone(),
        matches: project.match_track().current_slice().to_vec(),
        original_matches: project.match_track().original_slice().to_vec(),
        combed_frames: project.combed_frames().collect(),
        decimated_frames: project.decimation_track().decimated_frames().collect(),
        decimate_metrics: project.decimate_metrics.clone(),
        sections: project.sections().cloned().collect(),
        interlaced_fades: project
            .interlaced_fades()
            .map(|f| InterlacedFadeEntry {
                frame: f.frame,
                field_difference: f.field_difference,
            })
            .collect(),
        user_interface,
        presets: written(project.presets.is_empty())
            .then(|| project.presets().cloned().collect()),
        frozen_frames: written(project.freeze_frames.is_empty()).then(|| {
            project
                .freeze_frames()
                .iter()
                .map(|f| [f.first, f.last, f.replacement])
                .collect()
        }),
        custom_lists: written(project.custom_lists.is_empty()).then(|| {
            project
                .custom_lists()
                .iter()
                .map(|list| CustomListEntry {
                    name: list.name.clone(),
                    preset: list.preset.clone(),
                    position: list.position.name().to_string(),
                    frames: list.ranges.ranges().map(|r| [r.first, r.last]).collect(),
                })
                .collect()
        }),
        bookmarks: written(project.bookmarks.is_empty()).then(|| {
            project
                .bookmarks()
                .map(|b| BookmarkEntry {
                    frame: b.frame,
                    description: b.description.clone(),
                })
                .collect()
        }),
        resize: project.resize().map(|r| ResizeEntry {
            width: r.width,
            height: r.height,
            filter: r.filter.clone(),
        }),
        crop: project.crop().map(|c| CropEntry {
            early: c.early,
            left: c.left,
            top: c.top,
            right: c.right,
            bottom: c.bottom,
        }),
        depth: project.depth().map(|d| DepthEntry {
            bits: d.bits,
            float_samples: d.float_samples,
            dither: d.dither.clone(),
        }),
    }
}

fn check_length(key: &str, len: usize, frame_count: usize) -> ProjectResult<()> {
    if len != 0 && len != frame_count {
        return Err(ProjectError::invalid_value(
            key,
            format!("has {len} entries, expected {frame_count}"),
        ));
    }
    Ok(())
}

fn from_document(doc: ProjectDocument) -> ProjectResult<Project> {
    if doc.version > PROJECT_FORMAT_VERSION {
        return Err(ProjectError::invalid_value(
            "project format version",
            format!(
                "version {} is newer than the supported version {}",
                doc.version, PROJECT_FORMAT_VERSION
            ),
        ));
    }

    let variant = if doc.user_interface.is_some() {
        ProjectVariant::Interactive
    } else {
        ProjectVariant::Batch
    };
    let source = SourceInfo {
        input_file: doc.input_file,
        fps_num: doc.input_frame_rate[0],
        fps_den: doc.input_frame_rate[1],
        width: doc.input_resolution[0],
        height: doc.input_resolution[1],
        source_filter: doc.source_filter,
    };
    let mut trims = Vec::with_capacity(doc.trim.len());
    for [first, last] in doc.trim {
        let range = FrameRange::new(first, last);
        if !range.is_valid() {
            return Err(ProjectError::InvalidRange { range });
        }
        trims.push(range);
    }

    let mut project = Project::new(variant, source, trims)?;
    let frame_count = project.frame_count();

    project.vfm_parameters = parameters_from_json("vfm parameters", doc.vfm_parameters)?;
    project.vdecimate_parameters =
        parameters_from_json("vdecimate parameters", doc.vdecimate_parameters)?;

    check_length("mics", doc.mics.len(), frame_count)?;
    project.mics = doc.mics;
    check_length("decimate metrics", doc.decimate_metrics.len(), frame_count)?;
    project.decimate_metrics = doc.decimate_metrics;
    project.matches = MatchTrack::from_parts(frame_count, doc.matches, doc.original_matches)?;

    for frame in doc.combed_frames {
        project.add_combed_frame(frame)?;
    }
    for frame in doc.decimated_frames {
        project.add_decimated_frame(frame)?;
    }

    // Presets before anything that refers to them.
    for preset in doc.presets.unwrap_or_default() {
        project.add_preset(&preset.name, preset.contents)?;
    }
    for section in doc.sections {
        if section.start == 0 {
            project.set_section_presets(0, section.presets)?;
        } else {
            project.add_section_with(Section {
                start: section.start,
                presets: section.presets,
            })?;
        }
    }
    for list in doc.custom_lists.unwrap_or_default() {
        let position = by_name("custom lists", &list.position, FilterPosition::from_name)?;
        project.add_custom_list(&list.name, &list.preset, position)?;
        for [first, last] in list.frames {
            project.add_custom_list_range(&list.name, first, last)?;
        }
    }
    for [first, last, replacement] in doc.frozen_frames.unwrap_or_default() {
        project.add_freeze_frame(first, last, replacement)?;
    }
    for bookmark in doc.bookmarks.unwrap_or_default() {
        project.add_bookmark(bookmark.frame, bookmark.description)?;
    }
    for fade in doc.interlaced_fades {
        project.add_interlaced_fade(fade.frame, fade.field_difference)?;
    }

    project.resize = doc.resize.map(|r| Resize {
        width: r.width,
        height: r.height,
        filter: r.filter,
    });
    project.crop = doc.crop.map(|c| Crop {
        early: c.early,
        left: c.left,
        top: c.top,
        right: c.right,
        bottom: c.bottom,
    });
    project.depth = doc.depth.map(|d| Depth {
        bits: d.bits,
        float_samples: d.float_samples,
        dither: d.dither,
    });

    if let Some(ui) = doc.user_interface {
        project.pattern_guessing = guessing_from_entry(&ui.pattern_guessing)?;
        project.ui = UiState {
            zoom: ui.zoom,
            last_visited_frame: ui.last_visited_frame.min(frame_count - 1),
            geometry: ui.geometry,
            state: ui.state,
            shown_frame_rates: ui.shown_frame_rates,
            mic_search_minimum: ui.mic_search_minimum,
            c_match_sequences_minimum: ui.c_match_sequences_minimum,
        };
    }

    Ok(project)
}

/// Serialize a project to a JSON document.
pub fn to_json(project: &Project) -> ProjectResult<String> {
    Ok(serde_json::to_string_pretty(&to_document(project))?)
}

/// Build a project from a JSON document.
///
/// The variant is interactive when the document has a `user interface`
/// object. Optional keys take their defaults.
pub fn from_json(json: &str) -> ProjectResult<Project> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let Some(object) = value.as_object() else {
        return Err(ProjectError::invalid_value(
            "project",
            "top level must be an object",
        ));
    };
    if let Some(key) = REQUIRED_KEYS.iter().find(|key| !object.contains_key(**key)) {
        return Err(ProjectError::MissingKey { key: *key });
    }

    let doc: ProjectDocument = serde_json::from_value(value)?;
    from_document(doc)
}

/// Save a project, replacing `path` atomically.
pub fn save_project(project: &Project, path: &Path) -> ProjectResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ProjectError::io(parent, e))?;
    }

    let json = to_json(project)?;

    // Write atomically via temp file
    let temp_file = path.with_extension("json.tmp");
    fs::write(&temp_file, &json).map_err(|e| ProjectError::io(&temp_file, e))?;
    fs::rename(&temp_file, path).map_err(|e| ProjectError::io(path, e))?;

    info!("Saved project to {}", path.display());
    Ok(())
}

/// Load a project from `path`.
pub fn load_project(path: &Path) -> ProjectResult<Project> {
    let json = fs::read_to_string(path).map_err(|e| ProjectError::io(path, e))?;
    let project = from_json(&json)?;
    info!(
        "Loaded project {} ({} frames, {} sections)",
        path.display(),
        project.frame_count(),
        project.section_count()
    );
    debug!("Post-decimation frame count: {}", project.post_decimation_frame_count());
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Match;
    use crate::project::{ErrorKind, ProjectEvent};
    use tempfile::tempdir;

    fn sample_project() -> Project {
        let source = SourceInfo {
            input_file: "/videos/ep01.d2v".to_string(),
            fps_num: 30000,
            fps_den: 1001,
            width: 720,
            height: 480,
            source_filter: "d2v.Source".to_string(),
        };
        let mut p = Project::new(
            ProjectVariant::Interactive,
            source,
            [FrameRange::new(0, 29), FrameRange::new(100, 129)],
        )
        .unwrap();

        p.set_vfm_parameter("order", 1.0);
        p.set_vfm_parameter("scthresh", 12.5);
        for frame in 0..60 {
            p.set_mics(frame, [frame as i16, 1, 2, 3, 4]).unwrap();
            p.set_original_match(frame, Match::C).unwrap();
        }
        p.set_range_matches_from_pattern(0, 59, "cccnn").unwrap();
        p.add_decimated_frame(4).unwrap();
        p.add_decimated_frame(9).unwrap();
        p.add_combed_frame(17).unwrap();

        p.add_preset("deblock", "clip = core.deblock.Deblock(clip)").unwrap();
        p.add_preset("unused", "").unwrap();
        p.add_section(20).unwrap();
        p.assign_preset_to_section("deblock", 20).unwrap();
        p.add_custom_list("fades", "deblock", FilterPosition::PostDecimate)
            .unwrap();
        p.add_custom_list_range("fades", 5, 8).unwrap();
        p.add_custom_list_range("fades", 40, 44).unwrap();
        p.add_freeze_frame(30, 32, 29).unwrap();
        p.add_bookmark(50, "scene change").unwrap();
        p.add_interlaced_fade(12, 0.75).unwrap();
        p.set_crop(Some(Crop {
            early: true,
            left: 8,
            top: 0,
            right: 8,
            bottom: 0,
        }));
        p.pattern_guessing
            .failures
            .insert(20, GuessFailureReason::SectionTooShort);
        p
    }

    #[test]
    fn roundtrip_reproduces_state() {
        let original = sample_project();
        let json = to_json(&original).unwrap();
        let loaded = from_json(&json).unwrap();

        assert_eq!(loaded.variant(), ProjectVariant::Interactive);
        assert_eq!(loaded.frame_count(), 60);
        assert_eq!(loaded.match_track(), original.match_track());
        assert_eq!(loaded.decimation_track(), original.decimation_track());
        assert_eq!(
            loaded.sections().collect::<Vec<_>>(),
            original.sections().collect::<Vec<_>>()
        );
        assert_eq!(loaded.custom_lists(), original.custom_lists());
        assert_eq!(loaded.freeze_frames(), original.freeze_frames());
        assert_eq!(loaded.pattern_guessing(), original.pattern_guessing());
        assert_eq!(loaded.crop(), original.crop());
        assert_eq!(loaded.vfm_parameters(), original.vfm_parameters());
        assert_eq!(loaded.mics(7).unwrap(), [7, 1, 2, 3, 4]);
        assert!(loaded.is_combed_frame(17));
        assert_eq!(loaded.bookmark(50).unwrap().description, "scene change");

        // Saving again produces the same document.
        assert_eq!(to_json(&loaded).unwrap(), json);
    }

    #[test]
    fn document_uses_readable_keys() {
        let json = to_json(&sample_project()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["project format version"], 2);
        assert_eq!(value["input frame rate"], serde_json::json!([30000, 1001]));
        assert_eq!(value["trim"], serde_json::json!([[0, 29], [100, 129]]));
        // Integer parameters carry no fraction.
        assert_eq!(value["vfm parameters"]["order"].to_string(), "1");
        assert_eq!(value["vfm parameters"]["scthresh"], 12.5);
        assert_eq!(value["matches"][3], "n");
        assert_eq!(value["custom lists"][0]["position"], "post decimate");
        assert_eq!(
            value["user interface"]["pattern guessing"]["failures"][0]["reason"],
            "section too short"
        );
        assert_eq!(value["frozen frames"], serde_json::json!([[30, 32, 29]]));
    }

    #[test]
    fn batch_projects_skip_interactive_keys() {
        let p = Project::new(
            ProjectVariant::Batch,
            sample_project().source().clone(),
            [FrameRange::new(0, 9)],
        )
        .unwrap();
        let json = to_json(&p).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for key in ["user interface", "presets", "custom lists", "frozen frames"] {
            assert!(value.get(key).is_none(), "{key}");
        }
        assert_eq!(from_json(&json).unwrap().variant(), ProjectVariant::Batch);
    }

    #[test]
    fn batch_projects_keep_registries_in_use() {
        let mut p = Project::new(
            ProjectVariant::Batch,
            sample_project().source().clone(),
            [FrameRange::new(0, 99)],
        )
        .unwrap();
        p.add_preset("deblock", "clip = core.deblock.Deblock(clip)").unwrap();
        p.add_section(50).unwrap();
        p.assign_preset_to_section("deblock", 50).unwrap();
        p.add_custom_list("fix", "deblock", FilterPosition::PostFieldMatch)
            .unwrap();
        p.add_custom_list_range("fix", 10, 19).unwrap();
        p.add_freeze_frame(60, 62, 59).unwrap();
        p.add_bookmark(75, "credits").unwrap();
        p.set_crop(Some(Crop {
            early: false,
            left: 4,
            top: 0,
            right: 4,
            bottom: 0,
        }));

        let json = to_json(&p).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("user interface").is_none());

        let loaded = from_json(&json).unwrap();
        assert_eq!(loaded.variant(), ProjectVariant::Batch);
        assert_eq!(
            loaded.preset_contents("deblock").unwrap(),
            "clip = core.deblock.Deblock(clip)"
        );
        assert_eq!(loaded.section(50).unwrap().presets, vec!["deblock"]);
        assert_eq!(loaded.custom_lists(), p.custom_lists());
        assert_eq!(loaded.freeze_frames(), p.freeze_frames());
        assert_eq!(loaded.bookmark(75).unwrap().description, "credits");
        assert_eq!(loaded.crop(), p.crop());
        assert_eq!(to_json(&loaded).unwrap(), json);
    }

    #[test]
    fn missing_required_key_fails() {
        let json = to_json(&sample_project()).unwrap();
        for key in REQUIRED_KEYS {
            let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
            value.as_object_mut().unwrap().remove(key);
            let err = from_json(&value.to_string()).unwrap_err();
            assert!(matches!(err, ProjectError::MissingKey { key: k } if k == key));
            assert_eq!(err.kind(), ErrorKind::Format);
        }
    }

    #[test]
    fn optional_keys_take_defaults() {
        let json = r#"{
            "input file": "a.mkv",
            "input frame rate": [24000, 1001],
            "input resolution": [1920, 1080],
            "trim": [[0, 99]],
            "source filter": "lsmas.LWLibavSource",
            "user interface": {}
        }"#;
        let p = from_json(json).unwrap();
        assert_eq!(p.frame_count(), 100);
        assert_eq!(p.section_count(), 1);
        assert_eq!(p.ui_state(), &UiState::default());
        assert_eq!(p.pattern_guessing(), &PatternGuessing::default());
        assert_eq!(p.get_match(50).unwrap(), Match::C);
    }

    #[test]
    fn bad_values_are_format_errors() {
        let base = r#""input file": "a", "input frame rate": [1, 1],
            "input resolution": [1, 1], "source filter": "s""#;

        let err = from_json(&format!(r#"{{{base}, "trim": [[0, 9]], "mics": [[1,2,3,4,5]]}}"#))
            .unwrap_err();
        assert!(matches!(err, ProjectError::InvalidValue { .. }));

        let err = from_json(&format!(r#"{{{base}, "trim": [[0, 9]], "matches": ["x"]}}"#))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = from_json(&format!(r#"{{{base}, "trim": [[0, 9]], "sections": [{{"start": 20, "presets": []}}]}}"#))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);

        assert!(from_json("[1, 2]").is_err());
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("projects").join("ep01.json");

        let project = sample_project();
        save_project(&project, &path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let mut loaded = load_project(&path).unwrap();
        assert_eq!(loaded.match_track(), project.match_track());

        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = std::sync::Arc::clone(&seen);
        loaded.subscribe(Box::new(move |e| sink.lock().unwrap().push(e.clone())));
        loaded.delete_preset("deblock").unwrap();
        assert!(seen
            .lock()
            .unwrap()
            .contains(&ProjectEvent::CustomListsChanged));

        let err = load_project(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
