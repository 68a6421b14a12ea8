//! VapourSynth script generation.
//!
//! Builds the text of a script that the external engine executes. Stages are
//! always emitted in this order:
//!
//! 1. Preset functions
//! 2. Source
//! 3. Early crop
//! 4. Trims
//! 5. Post-source custom lists
//! 6. Field matching
//! 7. Post-field-match custom lists
//! 8. Sections
//! 9. Freeze frames
//! 10. Decimation
//! 11. Post-decimate custom lists
//! 12. Late crop
//! 13. Resize / bit depth
//! 14. Output
//!
//! Stages with nothing to do are left out.

use std::fmt::Write as _;

use tracing::debug;

use crate::config::ScriptSettings;
use crate::models::{Crop, FilterPosition, FrameRange, FreezeFrame};
use crate::project::{CycleDrops, Project, CYCLE_LENGTH};

/// Builder for the pipeline script of one project.
pub struct ScriptGenerator<'a> {
    project: &'a Project,
    header_comment: bool,
    prefer_select_every: bool,
}

impl<'a> ScriptGenerator<'a> {
    /// Create a generator with the default settings.
    pub fn new(project: &'a Project) -> Self {
        Self {
            project,
            header_comment: true,
            prefer_select_every: false,
        }
    }

    /// Create a generator configured from the `[script]` settings.
    pub fn from_settings(project: &'a Project, settings: &ScriptSettings) -> Self {
        Self {
            project,
            header_comment: settings.header_comment,
            prefer_select_every: settings.prefer_select_every,
        }
    }

    /// Emit a provenance comment as the first line.
    pub fn header_comment(mut self, enabled: bool) -> Self {
        self.header_comment = enabled;
        self
    }

    /// Always decimate with `SelectEvery`, even when `DeleteFrames` is shorter.
    pub fn prefer_select_every(mut self, enabled: bool) -> Self {
        self.prefer_select_every = enabled;
        self
    }

    /// Build the whole script.
    pub fn generate(&self) -> String {
        let mut script = String::new();

        if self.header_comment {
            let _ = writeln!(
                script,
                "# Generated by ivtc {} on {}",
                crate::version(),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            );
            script.push('\n');
        }

        script.push_str("import vapoursynth as vs\n\nc = vs.core\n\n");

        self.add_presets(&mut script);
        self.add_source(&mut script);

        if let Some(crop) = self.project.crop().filter(|c| c.early) {
            add_crop(&mut script, crop);
        }

        self.add_trims(&mut script);
        self.add_custom_lists(&mut script, FilterPosition::PostSource);
        self.add_field_matching(&mut script);
        self.add_custom_lists(&mut script, FilterPosition::PostFieldMatch);
        self.add_sections(&mut script);
        self.add_freeze_frames(&mut script);
        self.add_decimation(&mut script);
        self.add_custom_lists(&mut script, FilterPosition::PostDecimate);

        if let Some(crop) = self.project.crop().filter(|c| !c.early) {
            add_crop(&mut script, crop);
        }

        self.add_resize(&mut script);

        script.push_str("src.set_output()\n");
        script
    }

    fn add_presets(&self, script: &mut String) {
        for preset in self.project.presets() {
            let _ = writeln!(script, "def preset_{}(clip):", preset.name);
            for line in preset.contents.lines() {
                if line.trim().is_empty() {
                    script.push('\n');
                } else {
                    let _ = writeln!(script, "    {}", line);
                }
            }
            script.push_str("    return clip\n\n\n");
        }
    }

    fn add_source(&self, script: &mut String) {
        let source = self.project.source();
        let _ = writeln!(
            script,
            "src = c.{}('{}')\n",
            source.source_filter,
            escape_python(&source.input_file)
        );
    }

    fn add_trims(&self, script: &mut String) {
        let segments: Vec<String> = self
            .project
            .trims()
            .ranges()
            .map(|r| format!("src[{}:{}]", r.first, r.last + 1))
            .collect();
        let _ = writeln!(script, "src = {}\n", splice(&segments));
    }

    fn add_custom_lists(&self, script: &mut String, position: FilterPosition) {
        let post_decimate = position == FilterPosition::PostDecimate;
        let total = if post_decimate {
            self.project.post_decimation_frame_count()
        } else {
            self.project.frame_count()
        };

        for list in self.project.custom_lists() {
            if list.position != position || !list.is_active() {
                continue;
            }

            let ranges: Vec<(usize, usize)> = list
                .ranges
                .ranges()
                .map(|r| self.list_range(r, post_decimate))
                .filter(|(start, end)| start < end)
                .collect();
            if ranges.is_empty() {
                continue;
            }

            debug!(
                "Script: custom list {} at {} ({} ranges)",
                list.name,
                position,
                ranges.len()
            );

            let clip = format!("cl_{}", list.name);
            let _ = writeln!(script, "{} = preset_{}(src)", clip, list.preset);

            let mut segments = Vec::new();
            let mut next = 0;
            for (start, end) in ranges {
                if next < start {
                    segments.push(format!("src[{}:{}]", next, start));
                }
                segments.push(format!("{}[{}:{}]", clip, start, end));
                next = end;
            }
            if next < total {
                segments.push(format!("src[{}:{}]", next, total));
            }
            let _ = writeln!(script, "src = {}\n", splice(&segments));
        }
    }

    /// Half-open clip range covered by a list range.
    fn list_range(&self, range: FrameRange, post_decimate: bool) -> (usize, usize) {
        if post_decimate {
            let track = self.project.decimation_track();
            (
                track.kept_before(range.first),
                track.kept_before(range.last + 1),
            )
        } else {
            (range.first, range.last + 1)
        }
    }

    fn add_field_matching(&self, script: &mut String) {
        let track = self.project.match_track();
        if track.current_slice().is_empty() && !track.has_original() {
            return;
        }

        // VFM order 1 is top field first.
        let tff = self
            .project
            .vfm_parameters()
            .get("order")
            .map_or(true, |order| *order != 0.0);

        let _ = writeln!(
            script,
            "src = c.fh.FieldHint(clip=src, tff={}, matches='{}')\n",
            if tff { "True" } else { "False" },
            track.to_symbol_string()
        );
    }

    fn add_sections(&self, script: &mut String) {
        let sections: Vec<_> = self.project.sections().collect();
        if sections.iter().all(|s| s.presets.is_empty()) {
            return;
        }

        let mut segments: Vec<(String, usize, usize)> = Vec::new();
        for (i, section) in sections.iter().enumerate() {
            let end = sections
                .get(i + 1)
                .map_or(self.project.frame_count(), |next| next.start);

            let clip = if section.presets.is_empty() {
                "src".to_string()
            } else {
                let clip = format!("sec{}", section.start);
                let call = section
                    .presets
                    .iter()
                    .fold("src".to_string(), |inner, preset| {
                        format!("preset_{}({})", preset, inner)
                    });
                let _ = writeln!(script, "{} = {}", clip, call);
                clip
            };

            match segments.last_mut() {
                Some((last, _, last_end)) if *last == "src" && clip == "src" => *last_end = end,
                _ => segments.push((clip, section.start, end)),
            }
        }

        let segments: Vec<String> = segments
            .into_iter()
            .map(|(clip, start, end)| format!("{}[{}:{}]", clip, start, end))
            .collect();
        let _ = writeln!(script, "src = {}\n", splice(&segments));
    }

    fn add_freeze_frames(&self, script: &mut String) {
        let freeze_frames = self.project.freeze_frames();
        if freeze_frames.is_empty() {
            return;
        }

        let join = |f: fn(&FreezeFrame) -> usize| {
            freeze_frames
                .iter()
                .map(|ff| f(ff).to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        let _ = writeln!(
            script,
            "src = c.std.FreezeFrames(clip=src, first=[{}], last=[{}], replacement=[{}])\n",
            join(|ff| ff.first),
            join(|ff| ff.last),
            join(|ff| ff.replacement)
        );
    }

    fn add_decimation(&self, script: &mut String) {
        let track = self.project.decimation_track();
        if track.post_decimation_count() == track.frame_count() {
            return;
        }

        let delete_frames = self.delete_frames();
        let select_every = self.select_every();

        let text = match select_every {
            Some(select_every)
                if self.prefer_select_every || select_every.len() < delete_frames.len() =>
            {
                debug!("Script: decimation with SelectEvery");
                select_every
            }
            _ => {
                debug!("Script: decimation with DeleteFrames");
                delete_frames
            }
        };
        let _ = writeln!(script, "{}\n", text);
    }

    fn delete_frames(&self) -> String {
        let frames: Vec<String> = self
            .project
            .decimation_track()
            .decimated_frames()
            .map(|f| f.to_string())
            .collect();
        format!(
            "src = c.std.DeleteFrames(clip=src, frames=[{}])",
            frames.join(",")
        )
    }

    /// Decimation as one `SelectEvery` per run of identical cycles.
    ///
    /// Returns None when no frame would survive.
    fn select_every(&self) -> Option<String> {
        let track = self.project.decimation_track();
        let frame_count = track.frame_count();

        let mut runs: Vec<(CycleDrops, usize, usize)> = Vec::new();
        for cycle in 0..track.cycle_count() {
            let drops = track.cycle_drops(cycle);
            match runs.last_mut() {
                Some((last, _, count)) if *last == drops => *count += 1,
                _ => runs.push((drops, cycle, 1)),
            }
        }

        let mut segments = Vec::new();
        for (drops, first_cycle, count) in runs {
            if drops.len() == CYCLE_LENGTH {
                continue;
            }
            let start = first_cycle * CYCLE_LENGTH;
            let end = ((first_cycle + count) * CYCLE_LENGTH).min(frame_count);
            if drops.is_empty() {
                segments.push(format!("src[{}:{}]", start, end));
            } else {
                let offsets: Vec<String> = (0..CYCLE_LENGTH)
                    .filter(|&o| !drops.contains(o))
                    .map(|o| o.to_string())
                    .collect();
                segments.push(format!(
                    "src[{}:{}].std.SelectEvery(cycle={}, offsets=[{}])",
                    start,
                    end,
                    CYCLE_LENGTH,
                    offsets.join(",")
                ));
            }
        }

        if segments.is_empty() {
            return None;
        }
        Some(format!("src = {}", splice(&segments)))
    }

    fn add_resize(&self, script: &mut String) {
        let resize = self.project.resize();
        let depth = self.project.depth();
        if resize.is_none() && depth.is_none() {
            return;
        }

        let filter = resize.map_or("Bicubic".to_string(), |r| capitalize(&r.filter));
        let mut args = vec!["clip=src".to_string()];
        if let Some(resize) = resize {
            args.push(format!("width={}", resize.width));
            args.push(format!("height={}", resize.height));
        }
        if let Some(depth) = depth {
            args.push(format!(
                "format=src.format.replace(bits_per_sample={}, sample_type={})",
                depth.bits,
                if depth.float_samples {
                    "vs.FLOAT"
                } else {
                    "vs.INTEGER"
                }
            ));
            args.push(format!("dither_type='{}'", escape_python(&depth.dither)));
        }
        let _ = writeln!(script, "src = c.resize.{}({})\n", filter, args.join(", "));
    }
}

fn add_crop(script: &mut String, crop: &Crop) {
    let _ = writeln!(
        script,
        "src = c.std.CropRel(clip=src, left={}, top={}, right={}, bottom={})\n",
        crop.left, crop.top, crop.right, crop.bottom
    );
}

/// A single clip expression, or a splice of several.
fn splice(segments: &[String]) -> String {
    match segments {
        [single] => single.clone(),
        _ => format!("c.std.Splice(mismatch=True, clips=[{}])", segments.join(", ")),
    }
}

fn escape_python(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
