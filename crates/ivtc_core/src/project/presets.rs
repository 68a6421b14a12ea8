//! Preset registry.
//!
//! Renaming or deleting a preset updates every section and custom list
//! that refers to it.

use tracing::debug;

use super::{Project, ProjectError, ProjectEvent, ProjectResult};
use crate::models::Preset;

/// Whether `name` can be used as an identifier in the generated script.
///
/// Letters, digits and underscores; must not be empty or start with a digit.
pub fn is_name_safe(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Project {
    /// Presets in name order.
    pub fn presets(&self) -> impl Iterator<Item = &Preset> + '_ {
        self.presets.values()
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn preset_exists(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    pub fn add_preset(&mut self, name: &str, contents: impl Into<String>) -> ProjectResult<()> {
        if !is_name_safe(name) {
            return Err(ProjectError::invalid_name(name));
        }
        if self.presets.contains_key(name) {
            return Err(ProjectError::duplicate_name("Preset", name));
        }
        self.presets.insert(
            name.to_string(),
            Preset {
                name: name.to_string(),
                contents: contents.into(),
            },
        );
        self.notify(ProjectEvent::PresetsChanged);
        Ok(())
    }

    pub fn preset_contents(&self, name: &str) -> ProjectResult<&str> {
        self.presets
            .get(name)
            .map(|p| p.contents.as_str())
            .ok_or_else(|| ProjectError::no_such_preset(name))
    }

    pub fn set_preset_contents(
        &mut self,
        name: &str,
        contents: impl Into<String>,
    ) -> ProjectResult<()> {
        let preset = self
            .presets
            .get_mut(name)
            .ok_or_else(|| ProjectError::no_such_preset(name))?;
        preset.contents = contents.into();
        self.notify(ProjectEvent::PresetsChanged);
        Ok(())
    }

    /// Rename a preset and every reference to it.
    pub fn rename_preset(&mut self, old_name: &str, new_name: &str) -> ProjectResult<()> {
        if old_name == new_name {
            return Ok(());
        }
        if !self.presets.contains_key(old_name) {
            return Err(ProjectError::no_such_preset(old_name));
        }
        if !is_name_safe(new_name) {
            return Err(ProjectError::invalid_name(new_name));
        }
        if self.presets.contains_key(new_name) {
            return Err(ProjectError::duplicate_name("Preset", new_name));
        }

        let Some(mut preset) = self.presets.remove(old_name) else {
            return Err(ProjectError::no_such_preset(old_name));
        };
        preset.name = new_name.to_string();
        self.presets.insert(new_name.to_string(), preset);

        for section in self.sections.values_mut() {
            for name in section.presets.iter_mut() {
                if *name == old_name {
                    *name = new_name.to_string();
                }
            }
        }
        for list in self.custom_lists.iter_mut().filter(|l| l.preset == old_name) {
            list.preset = new_name.to_string();
        }

        debug!("Renamed preset '{}' to '{}'", old_name, new_name);
        self.notify(ProjectEvent::PresetsChanged);
        self.notify(ProjectEvent::SectionsChanged);
        self.notify(ProjectEvent::CustomListsChanged);
        Ok(())
    }

    /// Delete a preset, removing it from sections and clearing it from
    /// custom lists.
    pub fn delete_preset(&mut self, name: &str) -> ProjectResult<()> {
        if self.presets.remove(name).is_none() {
            return Err(ProjectError::no_such_preset(name));
        }

        for section in self.sections.values_mut() {
            section.presets.retain(|n| n != name);
        }
        for list in self.custom_lists.iter_mut().filter(|l| l.preset == name) {
            list.preset.clear();
        }

        debug!("Deleted preset '{}'", name);
        self.notify(ProjectEvent::PresetsChanged);
        self.notify(ProjectEvent::SectionsChanged);
        self.notify(ProjectEvent::CustomListsChanged);
        Ok(())
    }

    /// Whether any section or custom list refers to the preset.
    pub fn is_preset_in_use(&self, name: &str) -> bool {
        self.sections
            .values()
            .any(|s| s.presets.iter().any(|n| n == name))
            || self.custom_lists.iter().any(|l| l.preset == name)
    }
}
