//! Custom list registry.
//!
//! A custom list applies one preset to a set of frame ranges at one point of
//! the filter chain. Lists are kept in the order they are applied.

use super::{is_name_safe, Project, ProjectError, ProjectEvent, ProjectResult, RangeMap};
use crate::models::{FilterPosition, FrameRange};

/// Named set of frame ranges receiving an extra preset.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomList {
    pub name: String,
    /// Empty when no preset is assigned.
    pub preset: String,
    pub position: FilterPosition,
    pub ranges: RangeMap,
}

impl CustomList {
    pub fn new(name: impl Into<String>, preset: impl Into<String>, position: FilterPosition) -> Self {
        Self {
            name: name.into(),
            preset: preset.into(),
            position,
            ranges: RangeMap::new(),
        }
    }

    /// Whether the list would change the output.
    pub fn is_active(&self) -> bool {
        !self.preset.is_empty() && !self.ranges.is_empty()
    }
}

impl Project {
    /// Custom lists in application order.
    pub fn custom_lists(&self) -> &[CustomList] {
        &self.custom_lists
    }

    pub fn custom_list(&self, name: &str) -> Option<&CustomList> {
        self.custom_lists.iter().find(|l| l.name == name)
    }

    pub fn custom_list_index(&self, name: &str) -> ProjectResult<usize> {
        self.custom_lists
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| ProjectError::no_such_custom_list(name))
    }

    fn check_new_list_name(&self, name: &str) -> ProjectResult<()> {
        if !is_name_safe(name) {
            return Err(ProjectError::invalid_name(name));
        }
        if self.custom_list(name).is_some() {
            return Err(ProjectError::duplicate_name("Custom list", name));
        }
        Ok(())
    }

    fn check_optional_preset(&self, preset: &str) -> ProjectResult<()> {
        if !preset.is_empty() && !self.presets.contains_key(preset) {
            return Err(ProjectError::no_such_preset(preset));
        }
        Ok(())
    }

    /// Append a custom list without ranges. `preset` may be empty.
    pub fn add_custom_list(
        &mut self,
        name: &str,
        preset: &str,
        position: FilterPosition,
    ) -> ProjectResult<usize> {
        self.add_custom_list_with(CustomList::new(name, preset, position))
    }

    /// Append a fully built custom list.
    pub fn add_custom_list_with(&mut self, list: CustomList) -> ProjectResult<usize> {
        self.check_new_list_name(&list.name)?;
        self.check_optional_preset(&list.preset)?;
        if let Some(max) = list.ranges.max_frame() {
            self.check_frame(max)?;
        }
        self.custom_lists.push(list);
        self.notify(ProjectEvent::CustomListsChanged);
        Ok(self.custom_lists.len() - 1)
    }

    pub fn rename_custom_list(&mut self, old_name: &str, new_name: &str) -> ProjectResult<()> {
        let index = self.custom_list_index(old_name)?;
        if old_name == new_name {
            return Ok(());
        }
        self.check_new_list_name(new_name)?;
        self.custom_lists[index].name = new_name.to_string();
        self.notify(ProjectEvent::CustomListsChanged);
        Ok(())
    }

    pub fn delete_custom_list(&mut self, name: &str) -> ProjectResult<()> {
        let index = self.custom_list_index(name)?;
        self.custom_lists.remove(index);
        self.notify(ProjectEvent::CustomListsChanged);
        Ok(())
    }

    fn check_list_index(&self, index: usize) -> ProjectResult<()> {
        if index >= self.custom_lists.len() {
            return Err(ProjectError::CustomListIndexOutOfRange {
                index,
                count: self.custom_lists.len(),
            });
        }
        Ok(())
    }

    /// Move the list at `index` one step earlier in the chain.
    pub fn move_custom_list_up(&mut self, index: usize) -> ProjectResult<()> {
        self.check_list_index(index)?;
        if index > 0 {
            self.custom_lists.swap(index - 1, index);
            self.notify(ProjectEvent::CustomListsChanged);
        }
        Ok(())
    }

    /// Move the list at `index` one step later in the chain.
    pub fn move_custom_list_down(&mut self, index: usize) -> ProjectResult<()> {
        self.check_list_index(index)?;
        if index + 1 < self.custom_lists.len() {
            self.custom_lists.swap(index, index + 1);
            self.notify(ProjectEvent::CustomListsChanged);
        }
        Ok(())
    }

    /// Assign a preset to a list. An empty name unassigns.
    pub fn set_custom_list_preset(&mut self, name: &str, preset: &str) -> ProjectResult<()> {
        let index = self.custom_list_index(name)?;
        self.check_optional_preset(preset)?;
        self.custom_lists[index].preset = preset.to_string();
        self.notify(ProjectEvent::CustomListsChanged);
        Ok(())
    }

    pub fn set_custom_list_position(
        &mut self,
        name: &str,
        position: FilterPosition,
    ) -> ProjectResult<()> {
        let index = self.custom_list_index(name)?;
        self.custom_lists[index].position = position;
        self.notify(ProjectEvent::CustomListsChanged);
        Ok(())
    }

    /// Add `[first, last]` to a list.
    pub fn add_custom_list_range(
        &mut self,
        name: &str,
        first: usize,
        last: usize,
    ) -> ProjectResult<()> {
        let index = self.custom_list_index(name)?;
        self.check_frame(first)?;
        self.check_frame(last)?;
        self.custom_lists[index]
            .ranges
            .insert(FrameRange::new(first, last))?;
        self.notify(ProjectEvent::CustomListsChanged);
        Ok(())
    }

    /// Remove the range starting at `start` from a list.
    pub fn delete_custom_list_range(&mut self, name: &str, start: usize) -> ProjectResult<()> {
        let index = self.custom_list_index(name)?;
        if self.custom_lists[index].ranges.erase(start).is_none() {
            return Err(ProjectError::NoSuchEntry {
                what: "custom list range",
                frame: start,
            });
        }
        self.notify(ProjectEvent::CustomListsChanged);
        Ok(())
    }

    /// Range of a list containing `frame`.
    pub fn find_custom_list_range(
        &self,
        name: &str,
        frame: usize,
    ) -> ProjectResult<Option<FrameRange>> {
        let index = self.custom_list_index(name)?;
        Ok(self.custom_lists[index].ranges.find(frame).copied())
    }

    /// Whether the list has both a preset and at least one range.
    pub fn is_custom_list_in_use(&self, name: &str) -> ProjectResult<bool> {
        let index = self.custom_list_index(name)?;
        Ok(self.custom_lists[index].is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::project;
    use super::*;
    use crate::project::ErrorKind;

    #[test]
    fn add_validates_name_and_preset() {
        let mut p = project(100);
        p.add_preset("blur", "").unwrap();

        assert_eq!(
            p.add_custom_list("no good", "", FilterPosition::PostSource)
                .unwrap_err()
                .kind(),
            ErrorKind::Name
        );
        assert_eq!(
            p.add_custom_list("fix", "missing", FilterPosition::PostSource)
                .unwrap_err()
                .kind(),
            ErrorKind::Referential
        );
        assert_eq!(
            p.add_custom_list("fix", "blur", FilterPosition::PostSource)
                .unwrap(),
            0
        );
        assert_eq!(
            p.add_custom_list("fix", "", FilterPosition::PostSource)
                .unwrap_err()
                .kind(),
            ErrorKind::Name
        );
        assert_eq!(p.custom_lists().len(), 1);
    }

    #[test]
    fn ranges_are_bounds_and_overlap_checked() {
        let mut p = project(100);
        p.add_custom_list("fix", "", FilterPosition::PostFieldMatch)
            .unwrap();
        p.add_custom_list_range("fix", 10, 20).unwrap();

        assert_eq!(
            p.add_custom_list_range("fix", 90, 100).unwrap_err().kind(),
            ErrorKind::Range
        );
        assert!(matches!(
            p.add_custom_list_range("fix", 15, 30),
            Err(ProjectError::Overlap { .. })
        ));
        assert_eq!(
            p.find_custom_list_range("fix", 12).unwrap(),
            Some(FrameRange::new(10, 20))
        );
        assert!(!p.is_custom_list_in_use("fix").unwrap());

        p.delete_custom_list_range("fix", 10).unwrap();
        assert!(p.delete_custom_list_range("fix", 10).is_err());
        assert_eq!(p.find_custom_list_range("fix", 12).unwrap(), None);
    }

    #[test]
    fn reorder_rename_and_delete() {
        let mut p = project(100);
        for name in ["a", "b", "c"] {
            p.add_custom_list(name, "", FilterPosition::PostSource)
                .unwrap();
        }
        p.move_custom_list_up(2).unwrap();
        p.move_custom_list_down(0).unwrap();
        let names: Vec<&str> = p.custom_lists().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        assert!(matches!(
            p.move_custom_list_up(3),
            Err(ProjectError::CustomListIndexOutOfRange { index: 3, count: 3 })
        ));

        assert!(p.rename_custom_list("a", "b").is_err());
        p.rename_custom_list("a", "d").unwrap();
        p.delete_custom_list("c").unwrap();
        assert_eq!(p.custom_list_index("d").unwrap(), 0);
        assert!(p.custom_list("a").is_none());
    }

    #[test]
    fn in_use_needs_preset_and_ranges() {
        let mut p = project(100);
        p.add_preset("deint", "").unwrap();
        p.add_custom_list("fades", "", FilterPosition::PostSource)
            .unwrap();
        p.add_custom_list_range("fades", 0, 4).unwrap();
        assert!(!p.is_custom_list_in_use("fades").unwrap());

        p.set_custom_list_preset("fades", "deint").unwrap();
        p.set_custom_list_position("fades", FilterPosition::PostDecimate)
            .unwrap();
        assert!(p.is_custom_list_in_use("fades").unwrap());
        assert_eq!(
            p.custom_list("fades").unwrap().position,
            FilterPosition::PostDecimate
        );
    }
}
