// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video timeline scrubber control.
//!
//! This module provides the playback buttons, the frame slider and the
//! frame number field used to navigate extracted frames.

use crate::session::playback::PlaybackState;
use crate::session::AnnotationSession;

/// Result of timeline interaction.
pub enum TimelineAction {
    None,
    PlayBackward,
    StepBackward,
    Pause,
    StepForward,
    PlayForward,
    Slower,
    Faster,
    Seek(usize),
}

/// Display the timeline. `frame_text` holds the frame number field between frames.
pub fn show(ui: &mut egui::Ui, session: &AnnotationSession, frame_text: &mut String) -> TimelineAction {
    let mut action = TimelineAction::None;
    let total = session.total_images();
    let current = session.active_frame_index().unwrap_or(0);
    let state = session.playback_state();

    ui.add_enabled_ui(total > 0, |ui| {
        ui.horizontal(|ui| {
            if ui.button("🐢").on_hover_text("Slower").clicked() {
                action = TimelineAction::Slower;
            }
            if ui
                .selectable_label(state == PlaybackState::PlayingBackward, "⏪")
                .on_hover_text("Play backward")
                .clicked()
            {
                action = TimelineAction::PlayBackward;
            }
            if ui.button("⏮").on_hover_text("Previous frame").clicked() {
                action = TimelineAction::StepBackward;
            }
            if ui.button("⏸").on_hover_text("Pause").clicked() {
                action = TimelineAction::Pause;
            }
            if ui.button("⏭").on_hover_text("Next frame").clicked() {
                action = TimelineAction::StepForward;
            }
            if ui
                .selectable_label(state == PlaybackState::PlayingForward, "⏩")
                .on_hover_text("Play forward")
                .clicked()
            {
                action = TimelineAction::PlayForward;
            }
            if ui.button("🐇").on_hover_text("Faster").clicked() {
                action = TimelineAction::Faster;
            }

            if let Some(interval) = session.playback_interval_ms() {
                ui.label(egui::RichText::new(format!("{interval} ms/frame")).weak());
            }

            ui.separator();

            let mut slider_value = current;
            let max = total.saturating_sub(1);
            let slider = ui.add(egui::Slider::new(&mut slider_value, 0..=max).show_value(false));
            if slider.changed() {
                action = TimelineAction::Seek(slider_value);
            }

            let field = ui.add(egui::TextEdit::singleline(frame_text).desired_width(64.0));
            if field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                match frame_text.trim().parse::<usize>() {
                    Ok(index) => action = TimelineAction::Seek(index),
                    Err(_) => *frame_text = current.to_string(),
                }
            } else if !field.has_focus() {
                *frame_text = current.to_string();
            }
            ui.label(format!("/ {}", max));
        });
    });

    action
}
