// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory state of the open project.
//!
//! The session is either empty or holds one loaded project together with the
//! visible frame, its boxes, the active class and the playback position. The
//! UI only forwards input here and redraws when asked to.

pub mod box_tool;
pub mod history;
pub mod playback;

use crate::error::{AnnotatorError, Result};
use crate::io::labels;
use crate::io::media::{self, LoadedImage};
use crate::io::store::FrameLayout;
use crate::models::annotation::{BoundingBox, PixelRect, Point};
use crate::models::project::{ClassColor, Project};
use crate::util::geometry::{normalize_rect, DisplaySize};
use box_tool::{BoxTool, Tool, ToolEvent};
use history::{BoxEdit, History};
use playback::{PlaybackController, PlaybackState};
use std::time::{Duration, Instant};

/// A project with its visible frame.
struct LoadedProject {
    project: Project,
    layout: FrameLayout,
    playback: PlaybackController,
    active_class: Option<usize>,
    /// Frame whose image and boxes are held below. Playback may already
    /// point elsewhere while a step is being applied.
    frame_index: usize,
    boxes: Vec<BoundingBox>,
    history: History,
    /// Boxes differ from the label file on disk.
    dirty: bool,
    frame_image: LoadedImage,
    frame_revision: u64,
}

impl LoadedProject {
    fn save_labels(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        labels::write_labels(&self.layout.label_path(self.frame_index), &self.boxes)?;
        self.dirty = false;
        log::info!("Saved {} boxes for frame {}", self.boxes.len(), self.frame_index);
        Ok(())
    }

    /// Save the frame being left, then read image and boxes of `index`.
    fn show_frame(&mut self, index: usize) -> Result<()> {
        self.save_labels()?;
        let image = media::load_image(&self.layout.frame_path(index))?;
        let boxes = labels::read_labels(&self.layout.label_path(index))?;

        self.frame_image = image;
        self.frame_index = index;
        self.boxes = boxes;
        self.history.clear();
        self.frame_revision += 1;
        log::debug!("Showing frame {} ({} boxes)", index, self.boxes.len());
        Ok(())
    }
}

/// Annotation state for the application.
pub struct AnnotationSession {
    loaded: Option<LoadedProject>,
    tool: BoxTool,
    needs_redraw: bool,
}

impl Default for AnnotationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationSession {
    pub fn new() -> Self {
        Self {
            loaded: None,
            tool: BoxTool::new(),
            needs_redraw: false,
        }
    }

    /// Activate a project at frame 0. On failure the session keeps whatever it
    /// had before.
    pub fn load(&mut self, project: Project, interval_ms: u64) -> Result<()> {
        if project.extracted_count == 0 {
            return Err(AnnotatorError::NoFramesExtracted);
        }

        let layout = FrameLayout::new(project.root());
        let frame_image = media::load_image(&layout.frame_path(0))?;
        let boxes = labels::read_labels(&layout.label_path(0))?;

        self.close()?;
        log::info!(
            "Loaded project '{}' with {} frames",
            project.name,
            project.extracted_count
        );
        self.loaded = Some(LoadedProject {
            playback: PlaybackController::new(project.extracted_count, interval_ms),
            active_class: if project.classes.is_empty() { None } else { Some(0) },
            project,
            layout,
            frame_index: 0,
            boxes,
            history: History::new(),
            dirty: false,
            frame_image,
            frame_revision: 0,
        });
        self.tool.cancel();
        self.needs_redraw = true;
        Ok(())
    }

    /// Save pending labels and return to the empty state.
    pub fn close(&mut self) -> Result<()> {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.save_labels()?;
            log::info!("Closed project '{}'", loaded.project.name);
        }
        self.loaded = None;
        self.tool.cancel();
        self.needs_redraw = true;
        Ok(())
    }

    fn loaded_mut(&mut self) -> Result<&mut LoadedProject> {
        self.loaded.as_mut().ok_or(AnnotatorError::NoProject)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn project(&self) -> Option<&Project> {
        self.loaded.as_ref().map(|loaded| &loaded.project)
    }

    pub fn total_images(&self) -> usize {
        self.loaded.as_ref().map_or(0, |loaded| loaded.project.extracted_count)
    }

    pub fn active_frame_index(&self) -> Option<usize> {
        self.loaded.as_ref().map(|loaded| loaded.playback.current_index())
    }

    pub fn active_class_index(&self) -> Option<usize> {
        self.loaded.as_ref().and_then(|loaded| loaded.active_class)
    }

    /// Display color of the active class.
    pub fn active_color(&self) -> Option<ClassColor> {
        let loaded = self.loaded.as_ref()?;
        loaded.project.classes.color_of(loaded.active_class?)
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        self.loaded
            .as_ref()
            .map(|loaded| loaded.boxes.as_slice())
            .unwrap_or_default()
    }

    pub fn has_unsaved_labels(&self) -> bool {
        self.loaded.as_ref().is_some_and(|loaded| loaded.dirty)
    }

    pub fn frame_image(&self) -> Option<&LoadedImage> {
        self.loaded.as_ref().map(|loaded| &loaded.frame_image)
    }

    /// Changes whenever a different frame image is shown.
    pub fn frame_revision(&self) -> u64 {
        self.loaded.as_ref().map_or(0, |loaded| loaded.frame_revision)
    }

    /// Whether the view should repaint; resets the flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    // ------------------------------------------------------------------
    // Frames and classes
    // ------------------------------------------------------------------

    /// Show frame `index` (clamped). Stops playback.
    pub fn set_active_frame(&mut self, index: usize) -> Result<usize> {
        let loaded = self.loaded_mut()?;
        let previous = loaded.playback.current_index();
        let target = loaded.playback.seek(index);
        if target != previous {
            if let Err(e) = loaded.show_frame(target) {
                loaded.playback.seek(previous);
                return Err(e);
            }
        }
        self.tool.cancel();
        self.needs_redraw = true;
        Ok(target)
    }

    /// Make `name` the class new boxes are tagged with.
    pub fn set_active_class(&mut self, name: &str) -> Result<usize> {
        let loaded = self.loaded_mut()?;
        let index = loaded
            .project
            .classes
            .index_of(name)
            .ok_or_else(|| AnnotatorError::UnknownClass(name.to_string()))?;
        loaded.active_class = Some(index);
        self.needs_redraw = true;
        Ok(index)
    }

    pub fn clear_active_class(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.active_class = None;
        }
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    pub fn playback_state(&self) -> PlaybackState {
        self.loaded
            .as_ref()
            .map_or(PlaybackState::Stopped, |loaded| loaded.playback.state())
    }

    pub fn playback_interval_ms(&self) -> Option<u64> {
        self.loaded.as_ref().map(|loaded| loaded.playback.interval_ms())
    }

    pub fn play_forward(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.playback.play_forward();
        }
    }

    pub fn play_backward(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.playback.play_backward();
        }
    }

    pub fn pause(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.playback.pause();
        }
    }

    pub fn slower(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.playback.slower();
        }
    }

    pub fn faster(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.playback.faster();
        }
    }

    pub fn step_forward(&mut self) -> Result<bool> {
        self.step_with(PlaybackController::step_forward)
    }

    pub fn step_backward(&mut self) -> Result<bool> {
        self.step_with(PlaybackController::step_backward)
    }

    /// Advance playback if a step is due. Ticks are ignored while a pointer
    /// gesture is in progress so the frame never changes under a drag.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        if self.loaded.is_none() || self.tool.is_active() {
            return Ok(false);
        }
        self.step_with(|playback| playback.tick(now))
    }

    /// Time until playback wants the next tick.
    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.loaded.as_ref()?.playback.time_until_next(now)
    }

    fn step_with(&mut self, step: impl FnOnce(&mut PlaybackController) -> bool) -> Result<bool> {
        let loaded = self.loaded_mut()?;
        let previous = loaded.playback.current_index();
        if !step(&mut loaded.playback) {
            return Ok(false);
        }
        let index = loaded.playback.current_index();
        if let Err(e) = loaded.show_frame(index) {
            loaded.playback.seek(previous);
            return Err(e);
        }
        self.needs_redraw = true;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Tools and boxes
    // ------------------------------------------------------------------

    pub fn tool(&self) -> Tool {
        self.tool.tool()
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.tool.select(tool);
    }

    pub fn toggle_tool(&mut self, tool: Tool) {
        self.tool.toggle(tool);
    }

    /// Rubber band of the box being drawn, in display pixels.
    pub fn preview(&self) -> Option<PixelRect> {
        self.tool.preview()
    }

    pub fn pointer_pressed(&mut self, point: Point, display: DisplaySize) -> ToolEvent {
        if self.loaded.is_none() {
            return ToolEvent::None;
        }
        self.tool.press(point, display)
    }

    pub fn pointer_dragged(&mut self, point: Point) -> ToolEvent {
        self.tool.drag_to(point)
    }

    /// Finish a gesture. A finished rectangle becomes a box of the active
    /// class, normalized against the display size seen at press; with no
    /// active class it is discarded.
    pub fn pointer_released(&mut self) -> ToolEvent {
        let event = self.tool.release();
        let ToolEvent::BoxDrawn { rect, display } = event else {
            if event == ToolEvent::Discarded {
                log::warn!("Discarded a box with no area");
            }
            return event;
        };

        let Some(class_index) = self.active_class_index() else {
            log::warn!("Discarded a box drawn with no active class");
            return ToolEvent::Discarded;
        };
        self.add_box(normalize_rect(&rect, display, class_index));
        event
    }

    /// Append a box to the visible frame.
    pub fn add_box(&mut self, bbox: BoundingBox) {
        if let Some(loaded) = self.loaded.as_mut() {
            let index = loaded.boxes.len();
            loaded.history.apply(BoxEdit::Add { index, bbox }, &mut loaded.boxes);
            loaded.dirty = true;
            self.needs_redraw = true;
            log::info!("Added box of class {}, total: {}", bbox.class_index, loaded.boxes.len());
        }
    }

    pub fn remove_box(&mut self, index: usize) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };
        let Some(bbox) = loaded.boxes.get(index).copied() else {
            return false;
        };
        loaded.history.apply(BoxEdit::Remove { index, bbox }, &mut loaded.boxes);
        loaded.dirty = true;
        self.needs_redraw = true;
        log::info!("Removed box {}, total: {}", index, loaded.boxes.len());
        true
    }

    pub fn clear_boxes(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            if loaded.boxes.is_empty() {
                return;
            }
            let boxes = loaded.boxes.clone();
            loaded.history.apply(BoxEdit::Clear { boxes }, &mut loaded.boxes);
            loaded.dirty = true;
            self.needs_redraw = true;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.loaded.as_ref().is_some_and(|loaded| loaded.history.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.loaded.as_ref().is_some_and(|loaded| loaded.history.can_redo())
    }

    pub fn undo(&mut self) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };
        let changed = loaded.history.undo(&mut loaded.boxes);
        if changed {
            loaded.dirty = true;
            self.needs_redraw = true;
            log::info!("Undo");
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };
        let changed = loaded.history.redo(&mut loaded.boxes);
        if changed {
            loaded.dirty = true;
            self.needs_redraw = true;
            log::info!("Redo");
        }
        changed
    }

    /// Write the visible frame's boxes to its label file if they changed.
    pub fn save_labels(&mut self) -> Result<()> {
        self.loaded_mut()?.save_labels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::extract::CancelToken;
    use crate::io::media::testing::write_gif;
    use crate::io::pipeline;
    use crate::models::project::{ClassTable, NewProject};
    use std::fs;
    use std::path::Path;

    const DISPLAY: DisplaySize = DisplaySize { width: 200.0, height: 100.0 };

    fn demo_project(dir: &Path, frames: usize) -> Project {
        write_gif(&dir.join("clip.gif"), frames, 16, 8, 2);
        let request = NewProject {
            name: "demo".to_string(),
            video_file: dir.join("clip.gif"),
            destination_root: dir.to_path_buf(),
            classes: ClassTable::from_pairs([
                ("car", ClassColor::parse("#ff0000").unwrap()),
                ("bus", ClassColor::parse("#00ff00").unwrap()),
            ])
            .unwrap(),
            frame_extraction_stride: 1,
        };
        pipeline::create_project(&request, 16, &CancelToken::new(), |_| {})
            .unwrap()
            .project
    }

    fn loaded_session(dir: &Path, frames: usize) -> AnnotationSession {
        let mut session = AnnotationSession::new();
        session.load(demo_project(dir, frames), 100).unwrap();
        session
    }

    fn draw(session: &mut AnnotationSession, from: (f64, f64), to: (f64, f64)) -> ToolEvent {
        session.pointer_pressed(Point::new(from.0, from.1), DISPLAY);
        session.pointer_dragged(Point::new(to.0, to.1));
        session.pointer_released()
    }

    #[test]
    fn test_load_requires_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = demo_project(dir.path(), 3);
        project.extracted_count = 0;

        let mut session = AnnotationSession::new();
        assert!(matches!(session.load(project, 100), Err(AnnotatorError::NoFramesExtracted)));
        assert!(!session.is_loaded());
        assert_eq!(session.total_images(), 0);
    }

    #[test]
    fn test_box_tagged_with_active_class_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = loaded_session(dir.path(), 3);
        session.select_tool(Tool::Box);
        assert_eq!(session.set_active_class("bus").unwrap(), 1);
        assert_eq!(session.active_color(), Some(ClassColor::new(0, 255, 0)));

        assert!(matches!(draw(&mut session, (10.0, 10.0), (110.0, 60.0)), ToolEvent::BoxDrawn { .. }));
        session.save_labels().unwrap();

        let text = fs::read_to_string(dir.path().join("demo/labels/image_000000.txt")).unwrap();
        assert_eq!(text, "1 0.300000 0.350000 0.500000 0.500000\n");
    }

    #[test]
    fn test_unknown_class_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = loaded_session(dir.path(), 2);
        assert!(matches!(session.set_active_class("truck"), Err(AnnotatorError::UnknownClass(_))));
        assert_eq!(session.active_class_index(), Some(0));
    }

    #[test]
    fn test_degenerate_and_classless_boxes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = loaded_session(dir.path(), 2);
        session.select_tool(Tool::Box);

        session.pointer_pressed(Point::new(10.0, 10.0), DISPLAY);
        assert_eq!(session.pointer_released(), ToolEvent::Discarded);

        session.clear_active_class();
        assert_eq!(draw(&mut session, (10.0, 10.0), (50.0, 50.0)), ToolEvent::Discarded);
        assert!(session.boxes().is_empty());
        assert!(!session.has_unsaved_labels());
    }

    #[test]
    fn test_labels_saved_on_frame_change_and_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = loaded_session(dir.path(), 4);
        session.select_tool(Tool::Box);
        draw(&mut session, (0.0, 0.0), (100.0, 50.0));
        draw(&mut session, (100.0, 50.0), (199.0, 99.0));
        let drawn = session.boxes().to_vec();

        assert_eq!(session.set_active_frame(2).unwrap(), 2);
        assert!(session.boxes().is_empty());
        assert!(!session.can_undo());

        assert_eq!(session.set_active_frame(0).unwrap(), 0);
        assert_eq!(session.boxes().len(), 2);
        for (read, written) in session.boxes().iter().zip(&drawn) {
            assert!((read.center_x - written.center_x).abs() < 1e-6);
            assert!((read.width - written.width).abs() < 1e-6);
        }
    }

    #[test]
    fn test_set_active_frame_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = loaded_session(dir.path(), 5);
        assert_eq!(session.set_active_frame(99).unwrap(), 4);
        assert_eq!(session.active_frame_index(), Some(4));
    }

    #[test]
    fn test_undo_redo_through_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = loaded_session(dir.path(), 2);
        session.select_tool(Tool::Box);
        draw(&mut session, (10.0, 10.0), (60.0, 60.0));
        draw(&mut session, (20.0, 20.0), (90.0, 70.0));

        assert!(session.undo());
        assert_eq!(session.boxes().len(), 1);
        assert!(session.redo());
        assert_eq!(session.boxes().len(), 2);

        assert!(session.remove_box(0));
        assert_eq!(session.boxes().len(), 1);
        session.clear_boxes();
        assert!(session.boxes().is_empty());
        session.undo();
        session.undo();
        assert_eq!(session.boxes().len(), 2);
    }

    #[test]
    fn test_tick_ignored_while_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = loaded_session(dir.path(), 5);
        session.select_tool(Tool::Box);
        session.play_forward();

        session.pointer_pressed(Point::new(10.0, 10.0), DISPLAY);
        let now = Instant::now();
        assert!(!session.tick(now).unwrap());
        assert_eq!(session.active_frame_index(), Some(0));

        session.pointer_released();
        assert!(session.tick(now).unwrap());
        assert_eq!(session.active_frame_index(), Some(1));
    }

    #[test]
    fn test_manual_seek_stops_playback() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = loaded_session(dir.path(), 5);
        session.play_backward();
        session.set_active_frame(3).unwrap();
        assert_eq!(session.playback_state(), PlaybackState::Stopped);

        assert!(session.step_forward().unwrap());
        assert!(!session.step_forward().unwrap());
        assert_eq!(session.active_frame_index(), Some(4));
    }

    #[test]
    fn test_operations_without_project() {
        let mut session = AnnotationSession::new();
        assert!(matches!(session.set_active_frame(1), Err(AnnotatorError::NoProject)));
        assert!(matches!(session.save_labels(), Err(AnnotatorError::NoProject)));
        session.select_tool(Tool::Box);
        assert_eq!(session.pointer_pressed(Point::new(1.0, 1.0), DISPLAY), ToolEvent::None);
        assert!(!session.undo());
    }
}
