// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the annotation session, runs project creation
//! on a worker thread and routes UI actions into the session.

use crate::config::{AppConfig, Theme};
use crate::error::AnnotatorError;
use crate::io::extract::{CancelToken, ExtractionProgress, RESIZED_EDGE};
use crate::io::pipeline::{self, CreatedProject};
use crate::io::{serialization, store};
use crate::models::project::{NewProject, Project};
use crate::session::box_tool::{Tool, ToolEvent};
use crate::session::playback::PlaybackState;
use crate::session::AnnotationSession;
use crate::ui::canvas::{self, CanvasAction, ViewState};
use crate::ui::new_project::{self, FormAction, NewProjectForm};
use crate::ui::{properties, timeline, toolbar};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::Instant;

/// Messages from the project-creation worker.
enum ExtractionMessage {
    Progress(ExtractionProgress),
    Finished(Result<CreatedProject, AnnotatorError>),
}

/// A project creation running in the background.
struct ExtractionJob {
    receiver: Receiver<ExtractionMessage>,
    cancel: CancelToken,
    progress: Option<ExtractionProgress>,
    project_name: String,
}

/// Main application state.
pub struct AnnotatorApp {
    config: AppConfig,
    config_path: PathBuf,

    /// Open project, visible frame and tools
    session: AnnotationSession,

    /// Texture of the visible frame and the frame revision it was made from
    image_texture: Option<egui::TextureHandle>,
    texture_revision: Option<u64>,

    view: ViewState,

    /// New-project dialog, when open
    new_project: Option<NewProjectForm>,

    /// Background project creation, when running
    extraction: Option<ExtractionJob>,

    /// Blocking notification shown until dismissed
    message: Option<String>,

    /// Contents of the frame number field
    frame_text: String,
}

impl AnnotatorApp {
    /// Create a new application instance.
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, config_path: PathBuf) -> Self {
        let app = Self {
            config,
            config_path,
            session: AnnotationSession::new(),
            image_texture: None,
            texture_revision: None,
            view: ViewState::default(),
            new_project: None,
            extraction: None,
            message: None,
            frame_text: String::new(),
        };
        app.apply_theme(&cc.egui_ctx);
        app
    }

    fn notify(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{}", text);
        self.message = Some(text);
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save(&self.config_path) {
            log::warn!("Could not save settings to {}: {}", self.config_path.display(), e);
        }
    }

    fn apply_theme(&self, ctx: &egui::Context) {
        ctx.set_visuals(match self.config.theme {
            Theme::Light => egui::Visuals::light(),
            Theme::Dark => egui::Visuals::dark(),
        });
    }

    /// Start creating a project on a worker thread.
    fn start_project_creation(&mut self, request: NewProject, ctx: &egui::Context) {
        self.config.source_folder = request.video_file.parent().map(|p| p.to_path_buf());
        self.config.project_folder = Some(request.destination_root.clone());
        self.config.default_stride = request.frame_extraction_stride;
        self.save_config();

        let (sender, receiver) = channel();
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let ctx = ctx.clone();
        self.extraction = Some(ExtractionJob {
            receiver,
            cancel,
            progress: None,
            project_name: request.name.clone(),
        });

        // Spawn background thread for extraction
        std::thread::spawn(move || {
            let result = pipeline::create_project(&request, RESIZED_EDGE, &worker_cancel, |progress| {
                let _ = sender.send(ExtractionMessage::Progress(progress));
                ctx.request_repaint();
            });
            let _ = sender.send(ExtractionMessage::Finished(result));
            ctx.request_repaint();
        });
    }

    /// Drain worker messages; activate the project once it is ready.
    fn poll_extraction(&mut self) {
        let Some(job) = self.extraction.as_mut() else {
            return;
        };

        let mut finished = None;
        while let Ok(message) = job.receiver.try_recv() {
            match message {
                ExtractionMessage::Progress(progress) => job.progress = Some(progress),
                ExtractionMessage::Finished(result) => finished = Some(result),
            }
        }

        let Some(result) = finished else {
            return;
        };
        self.extraction = None;

        match result {
            Ok(created) => {
                if created.outcome.cancelled {
                    self.message = Some(format!(
                        "Extraction was cancelled. The project contains only the first {} frames.",
                        created.outcome.extracted
                    ));
                }
                self.activate(created.project);
            }
            Err(e) => self.notify(format!("Could not create project: {}", e)),
        }
    }

    fn activate(&mut self, project: Project) {
        match self.session.load(project, self.config.playback_interval_ms) {
            Ok(()) => {
                self.view.reset();
                self.texture_revision = None;
            }
            Err(e) => self.notify(format!("Could not open project: {}", e)),
        }
    }

    fn open_project_dialog(&mut self) {
        let mut dialog = rfd::FileDialog::new();
        if let Some(dir) = &self.config.project_folder {
            dialog = dialog.set_directory(dir);
        }
        let Some(root) = dialog.pick_folder() else {
            return;
        };
        match store::open_project(&root) {
            Ok(project) => {
                self.config.project_folder = root.parent().map(|p| p.to_path_buf());
                self.save_config();
                self.activate(project);
            }
            Err(e) => self.notify(format!("Could not open project: {}", e)),
        }
    }

    fn export_json_dialog(&mut self) {
        if let Err(e) = self.session.save_labels() {
            self.notify(format!("Could not save labels: {}", e));
            return;
        }
        let Some(project) = self.session.project() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(format!("{}.json", project.name))
            .save_file()
        else {
            return;
        };
        if let Err(e) = serialization::export_json(project, &path) {
            self.notify(format!("Failed to export annotations: {}", e));
        }
    }

    fn save_labels(&mut self) {
        if self.session.is_loaded() {
            if let Err(e) = self.session.save_labels() {
                self.notify(format!("Could not save labels: {}", e));
            }
        }
    }

    fn close_project(&mut self) {
        match self.session.close() {
            Ok(()) => {
                self.image_texture = None;
                self.texture_revision = None;
            }
            Err(e) => self.notify(format!("Could not save labels: {}", e)),
        }
    }

    /// Re-upload the frame texture when the session shows a new frame.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        if !self.session.is_loaded() {
            self.image_texture = None;
            self.texture_revision = None;
            return;
        }
        let revision = self.session.frame_revision();
        if self.texture_revision == Some(revision) {
            return;
        }
        if let Some(image) = self.session.frame_image() {
            let size = [image.width as usize, image.height as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
            self.image_texture = Some(ctx.load_texture("frame", color_image, egui::TextureOptions::LINEAR));
            self.texture_revision = Some(revision);
        }
    }

    fn handle_frame_result(&mut self, result: crate::error::Result<bool>) {
        if let Err(e) = result {
            self.notify(format!("Could not change frame: {}", e));
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || !self.session.is_loaded() {
            return;
        }

        let (undo, redo, save, escape, delete, left, right, space) = ctx.input(|i| {
            let command = i.modifiers.command;
            (
                command && !i.modifiers.shift && i.key_pressed(egui::Key::Z),
                (command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                    || (command && i.key_pressed(egui::Key::Y)),
                command && i.key_pressed(egui::Key::S),
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::Space),
            )
        });

        if undo {
            self.session.undo();
        }
        if redo {
            self.session.redo();
        }
        if save {
            self.save_labels();
        }
        if escape {
            self.session.select_tool(Tool::None);
        }
        if delete {
            let last = self.session.boxes().len().checked_sub(1);
            if let Some(index) = last {
                self.session.remove_box(index);
            }
        }
        if left {
            let result = self.session.step_backward();
            self.handle_frame_result(result);
        }
        if right {
            let result = self.session.step_forward();
            self.handle_frame_result(result);
        }
        if space {
            if self.session.playback_state() == PlaybackState::Stopped {
                self.session.play_forward();
            } else {
                self.session.pause();
            }
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                let busy = self.extraction.is_some();
                let loaded = self.session.is_loaded();

                ui.menu_button("File", |ui| {
                    if ui.add_enabled(!busy, egui::Button::new("New Project...")).clicked() {
                        self.new_project = Some(NewProjectForm::new(&self.config));
                        ui.close_menu();
                    }
                    if ui.add_enabled(!busy, egui::Button::new("Open Project...")).clicked() {
                        self.open_project_dialog();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.add_enabled(loaded, egui::Button::new("Save Labels (Ctrl+S)")).clicked() {
                        self.save_labels();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(loaded, egui::Button::new("Export Annotations as JSON..."))
                        .clicked()
                    {
                        self.export_json_dialog();
                        ui.close_menu();
                    }
                    if ui.add_enabled(loaded, egui::Button::new("Close Project")).clicked() {
                        self.close_project();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui
                        .add_enabled(self.session.can_undo(), egui::Button::new("Undo (Ctrl+Z)"))
                        .clicked()
                    {
                        self.session.undo();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.session.can_redo(), egui::Button::new("Redo (Ctrl+Shift+Z)"))
                        .clicked()
                    {
                        self.session.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    let has_boxes = !self.session.boxes().is_empty();
                    if ui.add_enabled(has_boxes, egui::Button::new("Clear Frame")).clicked() {
                        self.session.clear_boxes();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Zoom In").clicked() {
                        self.view.zoom_by(1.25);
                        ui.close_menu();
                    }
                    if ui.button("Zoom Out").clicked() {
                        self.view.zoom_by(0.8);
                        ui.close_menu();
                    }
                    if ui.button("Reset Zoom").clicked() {
                        self.view.reset();
                        ui.close_menu();
                    }
                    ui.separator();
                    let dark = self.config.theme == Theme::Dark;
                    if ui.selectable_label(dark, "Dark Theme").clicked() {
                        self.config.theme = if dark { Theme::Light } else { Theme::Dark };
                        self.apply_theme(ctx);
                        self.save_config();
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.message = Some(format!(
                            "Video Annotator {}\nExtract frames from a video and label objects with bounding boxes.",
                            env!("CARGO_PKG_VERSION")
                        ));
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn dialogs(&mut self, ctx: &egui::Context) {
        if let Some(form) = self.new_project.as_mut() {
            match new_project::show(ctx, form) {
                FormAction::Submit(request) => {
                    self.new_project = None;
                    self.close_project();
                    self.start_project_creation(request, ctx);
                }
                FormAction::Cancel => self.new_project = None,
                FormAction::None => {}
            }
        }

        if let Some(job) = &self.extraction {
            egui::Window::new("Extracting frames")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(format!("Creating project '{}'", job.project_name));
                    match job.progress {
                        Some(progress) => {
                            ui.add(egui::ProgressBar::new(progress.fraction()).show_percentage());
                            ui.label(format!("{} frames extracted", progress.extracted));
                        }
                        None => {
                            ui.spinner();
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        job.cancel.cancel();
                    }
                });
        }

        let mut dismissed = false;
        if let Some(message) = &self.message {
            egui::Window::new("Video Annotator")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
        }
        if dismissed {
            self.message = None;
        }
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_extraction();

        // Playback
        let now = Instant::now();
        let result = self.session.tick(now);
        self.handle_frame_result(result);
        if let Some(wait) = self.session.time_until_next_tick(now) {
            ctx.request_repaint_after(wait);
        }

        self.sync_texture(ctx);
        self.menu_bar(ctx);

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &self.session))
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::ToggleTool(tool) => self.session.toggle_tool(tool),
            toolbar::ToolbarAction::SelectClass(name) => {
                if let Err(e) = self.session.set_active_class(&name) {
                    self.notify(e.to_string());
                }
            }
            toolbar::ToolbarAction::ClearClass => self.session.clear_active_class(),
            toolbar::ToolbarAction::None => {}
        }

        // Timeline (bottom)
        let timeline_action = egui::TopBottomPanel::bottom("timeline")
            .show(ctx, |ui| timeline::show(ui, &self.session, &mut self.frame_text))
            .inner;
        match timeline_action {
            timeline::TimelineAction::PlayBackward => self.session.play_backward(),
            timeline::TimelineAction::PlayForward => self.session.play_forward(),
            timeline::TimelineAction::Pause => self.session.pause(),
            timeline::TimelineAction::Slower => self.session.slower(),
            timeline::TimelineAction::Faster => self.session.faster(),
            timeline::TimelineAction::StepBackward => {
                let result = self.session.step_backward();
                self.handle_frame_result(result);
            }
            timeline::TimelineAction::StepForward => {
                let result = self.session.step_forward();
                self.handle_frame_result(result);
            }
            timeline::TimelineAction::Seek(index) => {
                let result = self.session.set_active_frame(index).map(|_| true);
                self.handle_frame_result(result);
            }
            timeline::TimelineAction::None => {}
        }

        // Properties panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(260.0)
            .show(ctx, |ui| properties::show(ui, &self.session))
            .inner;
        match properties_action {
            properties::PropertiesAction::RemoveBox(index) => {
                self.session.remove_box(index);
            }
            properties::PropertiesAction::ClearBoxes => self.session.clear_boxes(),
            properties::PropertiesAction::None => {}
        }

        self.handle_keys(ctx);

        // Main canvas (center)
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| canvas::show(ui, &self.session, &self.image_texture, &self.view))
            .inner;
        match canvas_action {
            CanvasAction::Press(point, display) => {
                self.session.pointer_pressed(point, display);
            }
            CanvasAction::Drag(point) => {
                if let ToolEvent::Pan { dx, dy } = self.session.pointer_dragged(point) {
                    self.view.pan += egui::vec2(dx as f32, dy as f32);
                }
            }
            CanvasAction::Release => {
                self.session.pointer_released();
            }
            CanvasAction::Zoom(factor) => self.view.zoom_by(factor),
            CanvasAction::None => {}
        }

        self.dialogs(ctx);

        if self.session.take_redraw() {
            ctx.request_repaint();
        }
    }
}

impl Drop for AnnotatorApp {
    fn drop(&mut self) {
        if let Some(job) = &self.extraction {
            job.cancel.cancel();
        }
        if let Err(e) = self.session.close() {
            log::error!("Could not save labels on exit: {}", e);
        }
        self.save_config();
    }
}

