// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project data serialization and deserialization.
//!
//! This module handles the YAML project manifest and the JSON export of
//! every frame's annotations.

use crate::error::Result;
use crate::io::labels;
use crate::io::store::{frame_stem, FrameLayout};
use crate::models::annotation::BoundingBox;
use crate::models::project::Project;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Write the project manifest in YAML format.
pub fn export_manifest(project: &Project, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(project)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Read a project manifest in YAML format.
pub fn import_manifest(path: &Path) -> Result<Project> {
    let yaml = std::fs::read_to_string(path)?;
    let project = serde_yaml::from_str(&yaml)?;
    Ok(project)
}

/// Boxes of one extracted frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnnotations {
    pub frame: usize,
    pub image: String,
    pub boxes: Vec<BoundingBox>,
}

/// Whole-project export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationExport {
    pub project: Project,
    pub frames: Vec<FrameAnnotations>,
}

/// Collect the boxes of every extracted frame from the labels folder.
pub fn collect_annotations(project: &Project) -> Result<AnnotationExport> {
    let layout = FrameLayout::new(project.root());
    let frames = (0..project.extracted_count)
        .map(|seq| {
            Ok(FrameAnnotations {
                frame: seq,
                image: format!("{}.png", frame_stem(seq)),
                boxes: labels::read_labels(&layout.label_path(seq))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(AnnotationExport {
        project: project.clone(),
        frames,
    })
}

/// Export every frame's annotations to JSON format.
pub fn export_json(project: &Project, path: &Path) -> Result<()> {
    let export = collect_annotations(project)?;
    let json = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, json)?;
    log::info!(
        "Exported {} frames of '{}' to {}",
        export.frames.len(),
        project.name,
        path.display()
    );
    Ok(())
}
