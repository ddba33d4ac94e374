// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! This module provides the toolbar interface for selecting drawing
//! tools and the class new boxes are tagged with.

use crate::session::box_tool::Tool;
use crate::session::AnnotationSession;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    ToggleTool(Tool),
    SelectClass(String),
    ClearClass,
}

/// Display the toolbar with tool selection buttons and the class picker.
pub fn show(ui: &mut egui::Ui, session: &AnnotationSession) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let current_tool = session.tool();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;
        ui.add_enabled_ui(session.is_loaded(), |ui| {
            ui.label("Tools:");

            ui.separator();

            if ui.selectable_label(current_tool == Tool::Drag, "✋ Drag").clicked() {
                action = ToolbarAction::ToggleTool(Tool::Drag);
            }

            if ui.selectable_label(current_tool == Tool::Box, "▭ Box").clicked() {
                action = ToolbarAction::ToggleTool(Tool::Box);
            }

            if ui.selectable_label(current_tool == Tool::Polygon, "▱ Polygon").clicked() {
                action = ToolbarAction::ToggleTool(Tool::Polygon);
            }

            ui.separator();

            if let Some(project) = session.project() {
                let active = session
                    .active_class_index()
                    .and_then(|i| project.classes.get(i))
                    .map(|entry| entry.name.clone())
                    .unwrap_or_else(|| "(none)".to_string());

                egui::ComboBox::from_label("Class")
                    .selected_text(active.as_str())
                    .show_ui(ui, |ui| {
                        let none_selected = session.active_class_index().is_none();
                        if ui.selectable_label(none_selected, "(none)").clicked() {
                            action = ToolbarAction::ClearClass;
                        }
                        for entry in project.classes.iter() {
                            if ui.selectable_label(entry.name == active, &entry.name).clicked() {
                                action = ToolbarAction::SelectClass(entry.name.clone());
                            }
                        }
                    });
                if let Some(color) = session.active_color() {
                    super::color_swatch(ui, color);
                }
            }

            ui.separator();

            // Tool description
            let tool_text = match current_tool {
                Tool::None => "Select a tool to start annotating",
                Tool::Drag => "Drag to pan the frame",
                Tool::Box => "Drag to draw a box for the active class",
                Tool::Polygon => "Polygon annotations are not stored in label files yet",
            };

            ui.label(egui::RichText::new(tool_text).italics().weak());
        });
    });

    action
}
