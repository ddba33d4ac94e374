// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! On-disk project layout.
//!
//! ```text
//! <destination>/<project_name>/
//!   project.yaml
//!   frames/image_000000.png ...
//!   labels/image_000000.txt ...
//!   resized/image_000000.png ...
//! ```

use crate::error::{AnnotatorError, Result};
use crate::io::serialization;
use crate::models::project::{NewProject, Project};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const FRAMES_DIR: &str = "frames";
pub const LABELS_DIR: &str = "labels";
pub const RESIZED_DIR: &str = "resized";
pub const MANIFEST_FILE: &str = "project.yaml";

/// File stem shared by a frame's image, resized copy and label file.
pub fn frame_stem(seq: usize) -> String {
    format!("image_{seq:06}")
}

/// Paths of the three per-frame folders of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    pub frames_dir: PathBuf,
    pub labels_dir: PathBuf,
    pub resized_dir: PathBuf,
}

impl FrameLayout {
    pub fn new(project_root: &Path) -> Self {
        Self {
            frames_dir: project_root.join(FRAMES_DIR),
            labels_dir: project_root.join(LABELS_DIR),
            resized_dir: project_root.join(RESIZED_DIR),
        }
    }

    pub fn frame_path(&self, seq: usize) -> PathBuf {
        self.frames_dir.join(format!("{}.png", frame_stem(seq)))
    }

    pub fn label_path(&self, seq: usize) -> PathBuf {
        self.labels_dir.join(format!("{}.txt", frame_stem(seq)))
    }

    pub fn resized_path(&self, seq: usize) -> PathBuf {
        self.resized_dir.join(format!("{}.png", frame_stem(seq)))
    }
}

/// Create the project folder and its three subfolders.
///
/// Creating `<destination>/<name>` is itself the exclusivity check, so two
/// concurrent calls with the same name cannot both succeed.
pub fn create_project(request: &NewProject) -> Result<Project> {
    request.validate()?;

    let root = request.project_root();
    match fs::create_dir(&root) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(AnnotatorError::ProjectAlreadyExists(root));
        }
        Err(e) => return Err(e.into()),
    }

    let layout = FrameLayout::new(&root);
    for dir in [&layout.frames_dir, &layout.labels_dir, &layout.resized_dir] {
        fs::create_dir(dir)?;
    }

    let project = Project::from_request(request);
    save_project(&project)?;

    log::info!(
        "Created project '{}' at {} with {} classes",
        project.name,
        project.root_folder.display(),
        project.classes.len()
    );
    Ok(project)
}

/// Reopen the project rooted at `project_root`.
pub fn open_project(project_root: &Path) -> Result<Project> {
    let mut project = serialization::import_manifest(&project_root.join(MANIFEST_FILE))?;
    project.root_folder = project_root.to_path_buf();
    project.classes.validate()?;
    log::info!(
        "Opened project '{}' ({} frames)",
        project.name,
        project.extracted_count
    );
    Ok(project)
}

/// Rewrite the manifest of a project.
pub fn save_project(project: &Project) -> Result<()> {
    serialization::export_manifest(project, &project.root_folder.join(MANIFEST_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::{ClassColor, ClassTable};

    fn request(dir: &Path) -> NewProject {
        let video = dir.join("clip.gif");
        fs::write(&video, b"").unwrap();
        NewProject {
            name: "demo".to_string(),
            video_file: video,
            destination_root: dir.to_path_buf(),
            classes: ClassTable::from_pairs([
                ("car", ClassColor::new(255, 0, 0)),
                ("bus", ClassColor::new(0, 255, 0)),
            ])
            .unwrap(),
            frame_extraction_stride: 2,
        }
    }

    #[test]
    fn test_frame_paths() {
        let layout = FrameLayout::new(Path::new("/p/demo"));
        assert_eq!(layout.frame_path(7), PathBuf::from("/p/demo/frames/image_000007.png"));
        assert_eq!(layout.label_path(123456), PathBuf::from("/p/demo/labels/image_123456.txt"));
        assert_eq!(layout.resized_path(0), PathBuf::from("/p/demo/resized/image_000000.png"));
    }

    #[test]
    fn test_create_makes_layout() {
        let dir = tempfile::tempdir().unwrap();
        let project = create_project(&request(dir.path())).unwrap();

        assert_eq!(project.root_folder, dir.path().join("demo"));
        for sub in [FRAMES_DIR, LABELS_DIR, RESIZED_DIR] {
            assert!(project.root_folder.join(sub).is_dir());
        }
        assert_eq!(project.classes.index_of("bus"), Some(1));
    }

    #[test]
    fn test_second_create_fails_and_leaves_first_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let first = create_project(&request(dir.path())).unwrap();
        let marker = FrameLayout::new(&first.root_folder).label_path(0);
        fs::write(&marker, "0 0.5 0.5 0.1 0.1\n").unwrap();

        match create_project(&request(dir.path())) {
            Err(AnnotatorError::ProjectAlreadyExists(path)) => assert_eq!(path, first.root_folder),
            other => panic!("expected ProjectAlreadyExists, got {:?}", other),
        }
        assert_eq!(fs::read_to_string(&marker).unwrap(), "0 0.5 0.5 0.1 0.1\n");
    }

    #[test]
    fn test_invalid_request_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = request(dir.path());
        bad.classes = ClassTable::new();

        assert!(matches!(create_project(&bad), Err(AnnotatorError::Validation(_))));
        assert!(!dir.path().join("demo").exists());
    }

    #[test]
    fn test_reopen_restores_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let mut created = create_project(&request(dir.path())).unwrap();
        created.extracted_count = 15;
        save_project(&created).unwrap();

        let reopened = open_project(&dir.path().join("demo")).unwrap();
        assert_eq!(reopened, created);
    }
}
