//! Section registry.
//!
//! Sections are keyed by start frame; each one runs until the next start.
//! The section at frame 0 always exists.

use tracing::debug;

use super::{Project, ProjectError, ProjectEvent, ProjectResult, CYCLE_LENGTH};
use crate::models::Section;

/// Parse a five-symbol decimation pattern: `d` drops, `k` keeps.
pub fn parse_decimation_pattern(pattern: &str) -> ProjectResult<[bool; 5]> {
    let symbols: Vec<char> = pattern.chars().collect();
    if symbols.len() != CYCLE_LENGTH {
        return Err(ProjectError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "decimation patterns must be five symbols long",
        });
    }

    let mut drops = [false; 5];
    for (slot, symbol) in drops.iter_mut().zip(symbols) {
        *slot = match symbol {
            'd' => true,
            'k' => false,
            _ => {
                return Err(ProjectError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: "decimation patterns may only contain 'd' and 'k'",
                })
            }
        };
    }
    if drops.iter().all(|&d| d) {
        return Err(ProjectError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "a cycle must keep at least one frame",
        });
    }
    Ok(drops)
}

impl Project {
    /// Sections in ascending order of start frame.
    pub fn sections(&self) -> impl Iterator<Item = &Section> + '_ {
        self.sections.values()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Section starting exactly at `start`.
    pub fn section(&self, start: usize) -> Option<&Section> {
        self.sections.get(&start)
    }

    fn section_or_err(&self, start: usize) -> ProjectResult<&Section> {
        self.sections
            .get(&start)
            .ok_or(ProjectError::NoSuchSection { start })
    }

    fn section_mut_or_err(&mut self, start: usize) -> ProjectResult<&mut Section> {
        self.sections
            .get_mut(&start)
            .ok_or(ProjectError::NoSuchSection { start })
    }

    /// Section covering `frame`.
    pub fn find_section(&self, frame: usize) -> ProjectResult<&Section> {
        self.check_frame(frame)?;
        self.sections
            .range(..=frame)
            .next_back()
            .map(|(_, section)| section)
            .ok_or(ProjectError::NoSuchSection { start: 0 })
    }

    /// First section starting after `frame`.
    pub fn find_next_section(&self, frame: usize) -> Option<&Section> {
        self.sections
            .range(frame.saturating_add(1)..)
            .next()
            .map(|(_, section)| section)
    }

    /// Last section starting before `frame`.
    pub fn find_previous_section(&self, frame: usize) -> Option<&Section> {
        self.sections.range(..frame).next_back().map(|(_, s)| s)
    }

    /// Exclusive end of the section starting at `start`.
    pub fn section_end(&self, start: usize) -> ProjectResult<usize> {
        self.section_or_err(start)?;
        Ok(self
            .find_next_section(start)
            .map_or(self.frame_count, |next| next.start))
    }

    /// Add an empty section starting at `start`.
    pub fn add_section(&mut self, start: usize) -> ProjectResult<()> {
        self.add_section_with(Section::new(start))
    }

    /// Add a section with its preset list.
    pub fn add_section_with(&mut self, section: Section) -> ProjectResult<()> {
        self.check_frame(section.start)?;
        if self.sections.contains_key(&section.start) {
            return Err(ProjectError::SectionExists {
                start: section.start,
            });
        }
        self.check_presets_exist(&section.presets)?;

        debug!("Adding section at frame {}", section.start);
        self.sections.insert(section.start, section);
        self.notify(ProjectEvent::SectionsChanged);
        Ok(())
    }

    /// Delete the section starting at `start`.
    ///
    /// Its frames become part of the preceding section. Section 0 can't be
    /// deleted.
    pub fn delete_section(&mut self, start: usize) -> ProjectResult<()> {
        if start == 0 {
            return Err(ProjectError::FirstSectionUndeletable);
        }
        self.section_or_err(start)?;
        self.sections.remove(&start);
        self.pattern_guessing.failures.remove(&start);
        self.notify(ProjectEvent::SectionsChanged);
        Ok(())
    }

    pub(crate) fn check_presets_exist(&self, names: &[String]) -> ProjectResult<()> {
        match names.iter().find(|name| !self.presets.contains_key(*name)) {
            Some(missing) => Err(ProjectError::no_such_preset(missing.as_str())),
            None => Ok(()),
        }
    }

    /// Replace the preset list of a section.
    pub fn set_section_presets(&mut self, start: usize, presets: Vec<String>) -> ProjectResult<()> {
        self.section_or_err(start)?;
        self.check_presets_exist(&presets)?;
        self.section_mut_or_err(start)?.presets = presets;
        self.notify(ProjectEvent::SectionsChanged);
        Ok(())
    }

    /// Append a preset to a section's list.
    pub fn assign_preset_to_section(&mut self, preset: &str, start: usize) -> ProjectResult<()> {
        if !self.presets.contains_key(preset) {
            return Err(ProjectError::no_such_preset(preset));
        }
        self.section_mut_or_err(start)?.presets.push(preset.to_string());
        self.notify(ProjectEvent::SectionsChanged);
        Ok(())
    }

    fn check_preset_index(&self, start: usize, index: usize) -> ProjectResult<()> {
        if index >= self.section_or_err(start)?.presets.len() {
            return Err(ProjectError::PresetIndexOutOfRange {
                section: start,
                index,
            });
        }
        Ok(())
    }

    /// Remove the preset at `index` from a section's list.
    pub fn delete_preset_from_section(&mut self, start: usize, index: usize) -> ProjectResult<()> {
        self.check_preset_index(start, index)?;
        self.section_mut_or_err(start)?.presets.remove(index);
        self.notify(ProjectEvent::SectionsChanged);
        Ok(())
    }

    /// Swap the preset at `index` with the one before it.
    pub fn move_section_preset_up(&mut self, start: usize, index: usize) -> ProjectResult<()> {
        self.check_preset_index(start, index)?;
        if index == 0 {
            return Ok(());
        }
        self.section_mut_or_err(start)?.presets.swap(index - 1, index);
        self.notify(ProjectEvent::SectionsChanged);
        Ok(())
    }

    /// Swap the preset at `index` with the one after it.
    pub fn move_section_preset_down(&mut self, start: usize, index: usize) -> ProjectResult<()> {
        self.check_preset_index(start, index)?;
        let section = self.section_mut_or_err(start)?;
        if index + 1 == section.presets.len() {
            return Ok(());
        }
        section.presets.swap(index, index + 1);
        self.notify(ProjectEvent::SectionsChanged);
        Ok(())
    }

    /// Write a match pattern over a whole section.
    pub fn set_section_matches_from_pattern(
        &mut self,
        start: usize,
        pattern: &str,
    ) -> ProjectResult<()> {
        let end = self.section_end(start)?;
        self.set_range_matches_from_pattern(start, end - 1, pattern)
    }

    /// Restore the original matches of a whole section.
    pub fn reset_section_matches(&mut self, start: usize) -> ProjectResult<()> {
        let end = self.section_end(start)?;
        self.reset_range_matches(start, end - 1)
    }

    /// Decimate a whole section following a pattern such as `"kkkdk"`.
    ///
    /// Frame `f` of the section is dropped when `pattern[f % 5]` is `d`;
    /// every other frame of the section is undropped.
    pub fn set_section_decimation_from_pattern(
        &mut self,
        start: usize,
        pattern: &str,
    ) -> ProjectResult<()> {
        let drops = parse_decimation_pattern(pattern)?;
        let end = self.section_end(start)?;
        for frame in start..end {
            if drops[frame % CYCLE_LENGTH] {
                self.decimation.add(frame)?;
            } else {
                self.decimation.delete(frame)?;
            }
        }
        self.notify(ProjectEvent::DecimationChanged {
            first: start,
            last: end - 1,
        });
        Ok(())
    }
}
