// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! New project dialog.
//!
//! Collects the project name, source video, destination folder, stride and
//! class table. Submitting only succeeds once the request validates; errors
//! keep the dialog open with a message.

use crate::config::AppConfig;
use crate::error::ValidationError;
use crate::io::media;
use crate::models::project::{ClassColor, ClassTable, NewProject, VideoProperties};
use std::path::PathBuf;

/// Result of dialog interaction.
pub enum FormAction {
    None,
    Submit(NewProject),
    Cancel,
}

/// Form state kept between frames.
pub struct NewProjectForm {
    pub name: String,
    pub video_file: String,
    pub project_folder: String,
    pub stride: String,
    pub class_name: String,
    pub class_color: [u8; 3],
    pub classes: ClassTable,
    pub error: Option<String>,
    /// Properties of the picked video, or why it could not be opened
    video_info: Option<Result<VideoProperties, String>>,
    source_folder: Option<PathBuf>,
}

impl NewProjectForm {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            name: String::new(),
            video_file: String::new(),
            project_folder: config
                .project_folder
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            stride: config.default_stride.to_string(),
            class_name: String::new(),
            class_color: [0, 0, 0],
            classes: ClassTable::new(),
            error: None,
            video_info: None,
            source_folder: config.source_folder.clone(),
        }
    }

    /// Append the class typed in the class field.
    pub fn add_class(&mut self) {
        let [r, g, b] = self.class_color;
        match self.classes.append(self.class_name.trim(), ClassColor::new(r, g, b)) {
            Ok(_) => {
                self.class_name.clear();
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Build and validate the request.
    pub fn to_request(&self) -> Result<NewProject, ValidationError> {
        let stride = self
            .stride
            .trim()
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidStride)?;
        let request = NewProject {
            name: self.name.trim().to_string(),
            video_file: PathBuf::from(self.video_file.trim()),
            destination_root: PathBuf::from(self.project_folder.trim()),
            classes: self.classes.clone(),
            frame_extraction_stride: stride,
        };
        request.validate()?;
        Ok(request)
    }
}

pub fn show(ctx: &egui::Context, form: &mut NewProjectForm) -> FormAction {
    let mut action = FormAction::None;

    egui::Window::new("New Project")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            egui::Grid::new("new_project_form").num_columns(3).show(ui, |ui| {
                ui.label("Project name");
                ui.text_edit_singleline(&mut form.name);
                ui.end_row();

                ui.label("Video file");
                ui.text_edit_singleline(&mut form.video_file);
                if ui.button("Browse...").clicked() {
                    let mut dialog = rfd::FileDialog::new()
                        .add_filter("Videos", &["mp4", "avi", "mov", "mkv", "gif"]);
                    if let Some(dir) = &form.source_folder {
                        dialog = dialog.set_directory(dir);
                    }
                    if let Some(path) = dialog.pick_file() {
                        form.source_folder = path.parent().map(|p| p.to_path_buf());
                        form.video_file = path.display().to_string();
                        form.video_info = Some(media::probe(&path).map_err(|e| e.to_string()));
                    }
                }
                ui.end_row();

                if let Some(info) = &form.video_info {
                    ui.label("");
                    match info {
                        Ok(video) => ui.label(
                            egui::RichText::new(format!(
                                "{} x {}, {} frames at {:.2} fps",
                                video.width, video.height, video.frame_count, video.fps
                            ))
                            .weak(),
                        ),
                        Err(reason) => ui.colored_label(egui::Color32::from_rgb(193, 96, 105), reason),
                    };
                    ui.end_row();
                }

                ui.label("Project folder");
                ui.text_edit_singleline(&mut form.project_folder);
                if ui.button("Browse...").clicked() {
                    if let Some(path) = rfd::FileDialog::new().pick_folder() {
                        form.project_folder = path.display().to_string();
                    }
                }
                ui.end_row();

                ui.label("Frame stride");
                ui.add(egui::TextEdit::singleline(&mut form.stride).desired_width(48.0));
                ui.end_row();

                ui.label("Class");
                let field = ui.text_edit_singleline(&mut form.class_name);
                ui.horizontal(|ui| {
                    ui.color_edit_button_srgb(&mut form.class_color);
                    let enter = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Add").clicked() || enter {
                        form.add_class();
                    }
                });
                ui.end_row();
            });

            if !form.classes.is_empty() {
                ui.separator();
                for (index, entry) in form.classes.iter().enumerate() {
                    ui.horizontal(|ui| {
                        super::color_swatch(ui, entry.color);
                        ui.label(format!("{index}: {}  ({})", entry.name, entry.color));
                    });
                }
            }

            if let Some(error) = &form.error {
                ui.separator();
                ui.colored_label(egui::Color32::from_rgb(193, 96, 105), error);
            }

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Create").clicked() {
                    match form.to_request() {
                        Ok(request) => action = FormAction::Submit(request),
                        Err(e) => form.error = Some(e.to_string()),
                    }
                }
                if ui.button("Cancel").clicked() {
                    action = FormAction::Cancel;
                }
            });
        });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_default_to_black_and_keep_order() {
        let mut form = NewProjectForm::new(&AppConfig::default());
        form.class_name = "car".to_string();
        form.add_class();
        form.class_name = "bus".to_string();
        form.class_color = [0, 255, 0];
        form.add_class();

        assert_eq!(form.classes.color_of(0), Some(ClassColor::BLACK));
        assert_eq!(form.classes.index_of("bus"), Some(1));
        assert!(form.class_name.is_empty());

        form.class_name = "car".to_string();
        form.add_class();
        assert!(form.error.is_some());
        assert_eq!(form.classes.len(), 2);
    }

    #[test]
    fn test_request_validation_blocks_submission() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.gif");
        std::fs::write(&video, b"").unwrap();

        let mut form = NewProjectForm::new(&AppConfig::default());
        form.name = "demo".to_string();
        form.video_file = video.display().to_string();
        form.project_folder = dir.path().display().to_string();
        assert_eq!(form.to_request().unwrap_err(), ValidationError::NoClasses);

        form.class_name = "car".to_string();
        form.add_class();
        form.stride = "abc".to_string();
        assert_eq!(form.to_request().unwrap_err(), ValidationError::InvalidStride);

        form.stride = "2".to_string();
        let request = form.to_request().unwrap();
        assert_eq!(request.frame_extraction_stride, 2);
        assert_eq!(request.project_root(), dir.path().join("demo"));
    }
}
