//! Freeze frames, bookmarks, combed frames and interlaced fades.

use super::{Project, ProjectError, ProjectEvent, ProjectResult, RangeMap};
use crate::models::{Bookmark, FreezeFrame, InterlacedFade};

impl Project {
    // ---- freeze frames ----

    pub fn freeze_frames(&self) -> &RangeMap<FreezeFrame> {
        &self.freeze_frames
    }

    /// Replace every frame of `[first, last]` with `replacement`.
    pub fn add_freeze_frame(
        &mut self,
        first: usize,
        last: usize,
        replacement: usize,
    ) -> ProjectResult<()> {
        self.check_frame(first)?;
        self.check_frame(last)?;
        self.check_frame(replacement)?;
        self.freeze_frames.insert(FreezeFrame {
            first,
            last,
            replacement,
        })?;
        self.notify(ProjectEvent::FreezeFramesChanged);
        Ok(())
    }

    pub fn delete_freeze_frame(&mut self, first: usize) -> ProjectResult<()> {
        if self.freeze_frames.erase(first).is_none() {
            return Err(ProjectError::NoSuchEntry {
                what: "freeze frame",
                frame: first,
            });
        }
        self.notify(ProjectEvent::FreezeFramesChanged);
        Ok(())
    }

    /// Freeze frame covering `frame`.
    pub fn find_freeze_frame(&self, frame: usize) -> Option<&FreezeFrame> {
        self.freeze_frames.find(frame)
    }

    // ---- bookmarks ----

    pub fn bookmarks(&self) -> impl Iterator<Item = &Bookmark> + '_ {
        self.bookmarks.values()
    }

    pub fn bookmark(&self, frame: usize) -> Option<&Bookmark> {
        self.bookmarks.get(&frame)
    }

    /// Add a bookmark, replacing the description of an existing one.
    pub fn add_bookmark(&mut self, frame: usize, description: impl Into<String>) -> ProjectResult<()> {
        self.check_frame(frame)?;
        self.bookmarks.insert(
            frame,
            Bookmark {
                frame,
                description: description.into(),
            },
        );
        self.notify(ProjectEvent::BookmarksChanged);
        Ok(())
    }

    pub fn delete_bookmark(&mut self, frame: usize) -> ProjectResult<()> {
        if self.bookmarks.remove(&frame).is_none() {
            return Err(ProjectError::NoSuchEntry {
                what: "bookmark",
                frame,
            });
        }
        self.notify(ProjectEvent::BookmarksChanged);
        Ok(())
    }

    pub fn find_next_bookmark(&self, frame: usize) -> Option<&Bookmark> {
        self.bookmarks
            .range(frame.saturating_add(1)..)
            .next()
            .map(|(_, b)| b)
    }

    pub fn find_previous_bookmark(&self, frame: usize) -> Option<&Bookmark> {
        self.bookmarks.range(..frame).next_back().map(|(_, b)| b)
    }

    // ---- combed frames ----

    pub fn combed_frames(&self) -> impl Iterator<Item = usize> + '_ {
        self.combed_frames.iter().copied()
    }

    pub fn add_combed_frame(&mut self, frame: usize) -> ProjectResult<()> {
        self.check_frame(frame)?;
        if self.combed_frames.insert(frame) {
            self.notify(ProjectEvent::CombedFramesChanged);
        }
        Ok(())
    }

    pub fn delete_combed_frame(&mut self, frame: usize) -> ProjectResult<()> {
        self.check_frame(frame)?;
        if self.combed_frames.remove(&frame) {
            self.notify(ProjectEvent::CombedFramesChanged);
        }
        Ok(())
    }

    pub fn is_combed_frame(&self, frame: usize) -> bool {
        self.combed_frames.contains(&frame)
    }

    pub fn find_next_combed_frame(&self, frame: usize) -> Option<usize> {
        self.combed_frames
            .range(frame.saturating_add(1)..)
            .next()
            .copied()
    }

    pub fn find_previous_combed_frame(&self, frame: usize) -> Option<usize> {
        self.combed_frames.range(..frame).next_back().copied()
    }

    // ---- interlaced fades ----

    pub fn interlaced_fades(&self) -> impl Iterator<Item = &InterlacedFade> + '_ {
        self.interlaced_fades.values()
    }

    pub fn add_interlaced_fade(&mut self, frame: usize, field_difference: f64) -> ProjectResult<()> {
        self.check_frame(frame)?;
        self.interlaced_fades.insert(
            frame,
            InterlacedFade {
                frame,
                field_difference,
            },
        );
        self.notify(ProjectEvent::InterlacedFadesChanged);
        Ok(())
    }

    pub fn clear_interlaced_fades(&mut self) {
        self.interlaced_fades.clear();
        self.notify(ProjectEvent::InterlacedFadesChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::project;
    use crate::project::{ErrorKind, ProjectError};

    #[test]
    fn freeze_frames_check_bounds_and_overlap() {
        let mut p = project(50);
        p.add_freeze_frame(10, 14, 9).unwrap();

        assert_eq!(p.add_freeze_frame(20, 25, 50).unwrap_err().kind(), ErrorKind::Range);
        assert!(matches!(
            p.add_freeze_frame(14, 16, 17),
            Err(ProjectError::Overlap { .. })
        ));
        assert_eq!(p.find_freeze_frame(12).map(|f| f.replacement), Some(9));

        p.delete_freeze_frame(10).unwrap();
        assert_eq!(
            p.delete_freeze_frame(10).unwrap_err().kind(),
            ErrorKind::Referential
        );
        assert!(p.freeze_frames().is_empty());
    }

    #[test]
    fn bookmarks_navigate() {
        let mut p = project(100);
        p.add_bookmark(10, "opening").unwrap();
        p.add_bookmark(60, "credits").unwrap();
        p.add_bookmark(60, "ending").unwrap();

        assert_eq!(p.bookmarks().count(), 2);
        assert_eq!(p.find_next_bookmark(10).map(|b| b.frame), Some(60));
        assert_eq!(p.find_previous_bookmark(60).map(|b| b.frame), Some(10));
        assert!(p.find_previous_bookmark(10).is_none());
        assert_eq!(p.bookmark(60).unwrap().description, "ending");

        p.delete_bookmark(10).unwrap();
        assert!(p.delete_bookmark(10).is_err());
        assert!(p.add_bookmark(100, "").is_err());
    }

    #[test]
    fn combed_frames_navigate() {
        let mut p = project(30);
        for frame in [3, 17, 29] {
            p.add_combed_frame(frame).unwrap();
        }
        assert!(p.add_combed_frame(30).is_err());
        assert_eq!(p.find_next_combed_frame(3), Some(17));
        assert_eq!(p.find_next_combed_frame(29), None);
        assert_eq!(p.find_previous_combed_frame(17), Some(3));

        p.delete_combed_frame(17).unwrap();
        assert!(!p.is_combed_frame(17));
        assert_eq!(p.combed_frames().collect::<Vec<_>>(), vec![3, 29]);
    }

    #[test]
    fn interlaced_fades_are_keyed_by_frame() {
        let mut p = project(30);
        p.add_interlaced_fade(4, 1.5).unwrap();
        p.add_interlaced_fade(4, 2.5).unwrap();
        let fades: Vec<_> = p.interlaced_fades().collect();
        assert_eq!(fades.len(), 1);
        assert_eq!(fades[0].field_difference, 2.5);
    }
}
