// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for project creation, extraction and annotation.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a project-creation request is rejected before anything touches disk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("project name is empty")]
    EmptyProjectName,

    #[error("project name '{0}' cannot be used as a folder name")]
    InvalidProjectName(String),

    #[error("no video file selected")]
    EmptyVideoPath,

    #[error("video file not found: {}", .0.display())]
    VideoNotFound(PathBuf),

    #[error("no project folder selected")]
    EmptyProjectFolder,

    #[error("at least one class is required")]
    NoClasses,

    #[error("class names cannot be blank")]
    BlankClassName,

    #[error("class '{0}' is defined more than once")]
    DuplicateClass(String),

    #[error("frame extraction stride must be a positive integer")]
    InvalidStride,

    #[error("invalid color '{0}', expected \"r, g, b\" or #rrggbb")]
    InvalidColor(String),
}

/// Main error type for the annotator core.
#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("cannot open video {}: {}", .path.display(), .reason)]
    CannotOpenVideo { path: PathBuf, reason: String },

    #[error("project folder already exists: {}", .0.display())]
    ProjectAlreadyExists(PathBuf),

    #[error("invalid project: {0}")]
    Validation(#[from] ValidationError),

    #[error("no frames could be extracted from the video")]
    NoFramesExtracted,

    #[error(
        "no frames were extracted; {} was left on disk and must be removed before the name can be reused",
        .0.display()
    )]
    EmptyProject(PathBuf),

    #[error("no project is loaded")]
    NoProject,

    #[error("unknown class '{0}'")]
    UnknownClass(String),

    #[error("{}:{}: {}", .path.display(), .line, .reason)]
    MalformedLabel {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("video backend error: {0}")]
    VideoBackend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for annotator operations.
pub type Result<T> = std::result::Result<T, AnnotatorError>;

#[cfg(feature = "video-opencv")]
impl From<opencv::Error> for AnnotatorError {
    fn from(err: opencv::Error) -> Self {
        AnnotatorError::VideoBackend(err.to_string())
    }
}
