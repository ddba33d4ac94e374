// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the annotator.

pub mod canvas;
pub mod new_project;
pub mod properties;
pub mod timeline;
pub mod toolbar;

use crate::models::project::ClassColor;

/// Convert a class color for painting.
pub fn color32(color: ClassColor) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

/// Small filled square showing a class color.
pub fn color_swatch(ui: &mut egui::Ui, color: ClassColor) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 2.0, color32(color));
    ui.painter()
        .rect_stroke(rect, 2.0, egui::Stroke::new(1.0, egui::Color32::from_gray(120)));
}
