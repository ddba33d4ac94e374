// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Create-project workflow: validate, open the video, lay out the folders,
//! extract frames, record the result.

use crate::error::{AnnotatorError, Result};
use crate::io::extract::{CancelToken, ExtractionOutcome, ExtractionProgress, FrameExtractor};
use crate::io::media;
use crate::io::store::{self, FrameLayout};
use crate::models::project::{NewProject, Project};

/// A project whose frames have been extracted.
#[derive(Debug, Clone)]
pub struct CreatedProject {
    pub project: Project,
    pub outcome: ExtractionOutcome,
}

/// Run the whole creation workflow.
///
/// The video is opened before any folder is created, so an unreadable source
/// leaves the destination untouched. A cancelled extraction still returns the
/// project with the frames written so far, unless nothing was written.
pub fn create_project(
    request: &NewProject,
    resize_edge: u32,
    cancel: &CancelToken,
    on_progress: impl FnMut(ExtractionProgress),
) -> Result<CreatedProject> {
    request.validate()?;

    let mut stream = media::open_video(&request.video_file)?;
    let properties = stream.properties();
    log::info!(
        "Opened {}: {}x{}, {} frames at {:.2} fps",
        request.video_file.display(),
        properties.width,
        properties.height,
        properties.frame_count,
        properties.fps
    );

    let mut project = store::create_project(request)?;
    project.video = Some(properties);

    let layout = FrameLayout::new(project.root());
    let outcome = FrameExtractor::new(request.frame_extraction_stride)
        .with_resize_edge(resize_edge)
        .extract(stream.as_mut(), &layout, cancel, on_progress)?;
    drop(stream);

    project.extracted_count = outcome.extracted;
    store::save_project(&project)?;

    // The folder stays; creation never rolls back
    if outcome.extracted == 0 {
        log::warn!("Project '{}' has no frames", project.name);
        return Err(AnnotatorError::EmptyProject(project.root_folder));
    }
    Ok(CreatedProject { project, outcome })
}
