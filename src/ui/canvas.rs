// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for frame display and annotation.
//!
//! This module provides the main canvas area where users view the active
//! frame and drag out bounding boxes.

use crate::models::annotation::{PixelRect, Point};
use crate::session::AnnotationSession;
use crate::util::geometry::{denormalize_box, DisplaySize};

/// Zoom and pan applied on top of fit-to-canvas scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub zoom: f32,
    pub pan: egui::Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
        }
    }
}

impl ViewState {
    pub const MIN_ZOOM: f32 = 1.0;
    pub const MAX_ZOOM: f32 = 8.0;

    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        if self.zoom == Self::MIN_ZOOM {
            self.pan = egui::Vec2::ZERO;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of canvas interaction, in coordinates local to the displayed frame.
pub enum CanvasAction {
    None,
    Press(Point, DisplaySize),
    Drag(Point),
    Release,
    Zoom(f32),
}

/// Display the main canvas area and handle mouse interactions.
pub fn show(
    ui: &mut egui::Ui,
    session: &AnnotationSession,
    image_texture: &Option<egui::TextureHandle>,
    view: &ViewState,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    // Set background color
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
    let canvas_rect = response.rect;
    painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));

    let (Some(texture), Some(image)) = (image_texture, session.frame_image()) else {
        // Show welcome message when no project is open
        painter.text(
            canvas_rect.center(),
            egui::Align2::CENTER_CENTER,
            "File → New Project... to extract frames and start annotating",
            egui::FontId::proportional(16.0),
            egui::Color32::from_gray(180),
        );
        return action;
    };

    // Calculate scaling to fit the frame in the available space
    let available = canvas_rect.size();
    let img_aspect = image.width as f32 / image.height.max(1) as f32;
    let available_aspect = available.x / available.y.max(1.0);
    let (fit_width, fit_height) = if img_aspect > available_aspect {
        (available.x, available.x / img_aspect)
    } else {
        (available.y * img_aspect, available.y)
    };
    let display_width = fit_width * view.zoom;
    let display_height = fit_height * view.zoom;

    // Center the frame, then apply the pan offset
    let image_rect = egui::Rect::from_center_size(
        canvas_rect.center() + view.pan,
        egui::vec2(display_width, display_height),
    );
    let display = DisplaySize::new(display_width as f64, display_height as f64);

    painter.image(
        texture.id(),
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );

    let to_local = |pos: egui::Pos2| {
        Point::new((pos.x - image_rect.min.x) as f64, (pos.y - image_rect.min.y) as f64)
    };

    if response.drag_started() {
        let origin = ui
            .input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(pos) = origin {
            action = CanvasAction::Press(to_local(pos), display);
        }
    } else if response.drag_stopped() {
        action = CanvasAction::Release;
    } else if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            action = CanvasAction::Drag(to_local(pos));
        }
    } else if response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            action = CanvasAction::Zoom(if scroll > 0.0 { 1.1 } else { 1.0 / 1.1 });
        }
    }

    // Draw boxes in list order so later boxes sit on top
    if let Some(project) = session.project() {
        for bbox in session.boxes() {
            let color = project
                .classes
                .color_of(bbox.class_index)
                .map(super::color32)
                .unwrap_or(egui::Color32::WHITE);
            let rect = denormalize_box(bbox, display);
            painter.rect_stroke(to_screen(&rect, image_rect), 0.0, egui::Stroke::new(1.5, color));
        }
    }

    // Draw the rubber band of the box being dragged
    if let Some(preview) = session.preview() {
        let color = session
            .active_color()
            .map(super::color32)
            .unwrap_or(egui::Color32::LIGHT_BLUE);
        painter.rect_stroke(to_screen(&preview, image_rect), 0.0, egui::Stroke::new(1.0, color));
    }

    action
}

/// Convert a rectangle local to the frame into screen space.
fn to_screen(rect: &PixelRect, image_rect: egui::Rect) -> egui::Rect {
    let min = rect.min();
    let max = rect.max();
    egui::Rect::from_min_max(
        image_rect.min + egui::vec2(min.x as f32, min.y as f32),
        image_rect.min + egui::vec2(max.x as f32, max.y as f32),
    )
}
