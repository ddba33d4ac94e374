// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project properties panel.
//!
//! Shows the source video's properties, the class table and the boxes of
//! the visible frame.

use crate::session::AnnotationSession;

/// Result of properties panel interaction.
pub enum PropertiesAction {
    None,
    RemoveBox(usize),
    ClearBoxes,
}

pub fn show(ui: &mut egui::Ui, session: &AnnotationSession) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    let Some(project) = session.project() else {
        ui.heading("Project");
        ui.label(egui::RichText::new("No project loaded").weak());
        return action;
    };

    ui.heading(&project.name);
    ui.separator();

    egui::Grid::new("video_properties").num_columns(2).show(ui, |ui| {
        ui.label("File Name");
        ui.label(project.video_file_name());
        ui.end_row();

        if let Some(video) = project.video {
            ui.label("Width X Height");
            ui.label(format!("{} x {}", video.width, video.height));
            ui.end_row();

            ui.label("Aspect Ratio");
            ui.label(format!("{:.3}", video.aspect_ratio()));
            ui.end_row();

            ui.label("Total Frames");
            ui.label(video.frame_count.to_string());
            ui.end_row();

            ui.label("FPS");
            ui.label(format!("{:.2}", video.fps));
            ui.end_row();
        }

        ui.label("Stride");
        ui.label(project.frame_extraction_stride.to_string());
        ui.end_row();

        ui.label("Extracted");
        ui.label(project.extracted_count.to_string());
        ui.end_row();
    });

    ui.separator();
    ui.label(egui::RichText::new("Classes").strong());
    for (index, entry) in project.classes.iter().enumerate() {
        ui.horizontal(|ui| {
            super::color_swatch(ui, entry.color);
            ui.label(format!("{index}: {}", entry.name))
                .on_hover_text(entry.color.to_hex());
        });
    }

    ui.separator();
    ui.horizontal(|ui| {
        let frame = session.active_frame_index().unwrap_or(0);
        ui.label(egui::RichText::new(format!("Boxes in frame {frame}")).strong());
        if session.has_unsaved_labels() {
            ui.label(egui::RichText::new("(unsaved)").weak());
        }
    });

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (index, bbox) in session.boxes().iter().enumerate() {
            let name = project
                .classes
                .get(bbox.class_index)
                .map(|entry| entry.name.as_str())
                .unwrap_or("?");
            ui.horizontal(|ui| {
                if let Some(color) = project.classes.color_of(bbox.class_index) {
                    super::color_swatch(ui, color);
                }
                ui.label(format!(
                    "{name}  ({:.3}, {:.3})  {:.3} x {:.3}",
                    bbox.center_x, bbox.center_y, bbox.width, bbox.height
                ));
                if ui.small_button("🗑").on_hover_text("Delete box").clicked() {
                    action = PropertiesAction::RemoveBox(index);
                }
            });
        }
    });

    if !session.boxes().is_empty() && ui.button("Clear frame").clicked() {
        action = PropertiesAction::ClearBoxes;
    }

    action
}
