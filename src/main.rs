// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video Annotator
//!
//! A cross-platform desktop application that extracts frames from a video
//! and labels objects in them with class-tagged bounding boxes.

mod app;
mod config;
mod error;
mod io;
mod models;
mod session;
mod ui;
mod util;

use anyhow::Result;
use app::AnnotatorApp;
use config::AppConfig;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config_path = AppConfig::default_path();
    let config = AppConfig::load_or_default(&config_path);
    log::info!("Using settings from {}", config_path.display());

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Video Annotator"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Video Annotator",
        options,
        Box::new(move |cc| Ok(Box::new(AnnotatorApp::new(cc, config, config_path)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
