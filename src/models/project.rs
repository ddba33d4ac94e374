// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! A project binds one source video to one ordered class table. The order of
//! the class table is load-bearing: a class's position is the integer index
//! written to label files, so classes can only ever be appended.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// An RGB display color for a class.
///
/// Parsed from either `"r, g, b"` or `#rrggbb`; always written back in the
/// `"r, g, b"` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ClassColor {
    pub const BLACK: ClassColor = ClassColor { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse(text: &str) -> std::result::Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidColor(text.to_string());
        let trimmed = text.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(invalid());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?));
        }

        let channels = trimmed
            .split(',')
            .map(|part| part.trim().parse::<u8>().map_err(|_| invalid()))
            .collect::<std::result::Result<Vec<u8>, _>>()?;
        match channels.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for ClassColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for ClassColor {
    type Error = ValidationError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClassColor> for String {
    fn from(color: ClassColor) -> Self {
        color.to_string()
    }
}

/// One named class and its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    pub color: ClassColor,
}

/// Insertion-ordered class table. Position in the table is the class index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassTable {
    entries: Vec<ClassEntry>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, color)` pairs, keeping their order.
    pub fn from_pairs<I, S>(pairs: I) -> std::result::Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (S, ClassColor)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, color) in pairs {
            table.append(name, color)?;
        }
        Ok(table)
    }

    /// Append a class at the end of the table. Existing indices never move.
    pub fn append(&mut self, name: impl Into<String>, color: ClassColor) -> std::result::Result<usize, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::BlankClassName);
        }
        if self.index_of(&name).is_some() {
            return Err(ValidationError::DuplicateClass(name));
        }
        self.entries.push(ClassEntry { name, color });
        Ok(self.entries.len() - 1)
    }

    /// Resolve a class name (case-sensitive) to its index.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&ClassEntry> {
        self.entries.get(index)
    }

    pub fn color_of(&self, index: usize) -> Option<ClassColor> {
        self.entries.get(index).map(|entry| entry.color)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the invariants a table read from disk must satisfy.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.entries.is_empty() {
            return Err(ValidationError::NoClasses);
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(ValidationError::BlankClassName);
            }
            if self.entries[..i].iter().any(|other| other.name == entry.name) {
                return Err(ValidationError::DuplicateClass(entry.name.clone()));
            }
        }
        Ok(())
    }
}

/// Intrinsic properties of a source video, read once at project creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    pub frame_count: u64,
    pub fps: f64,
}

impl VideoProperties {
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f64 / self.height as f64
    }
}

/// Everything the new-project form collects.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub video_file: PathBuf,
    pub destination_root: PathBuf,
    pub classes: ClassTable,
    pub frame_extraction_stride: u32,
}

impl NewProject {
    /// Reject requests that cannot possibly produce a project.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyProjectName);
        }
        if name != self.name
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
        {
            return Err(ValidationError::InvalidProjectName(self.name.clone()));
        }
        if self.video_file.as_os_str().is_empty() {
            return Err(ValidationError::EmptyVideoPath);
        }
        if !self.video_file.is_file() {
            return Err(ValidationError::VideoNotFound(self.video_file.clone()));
        }
        if self.destination_root.as_os_str().is_empty() {
            return Err(ValidationError::EmptyProjectFolder);
        }
        if self.frame_extraction_stride == 0 {
            return Err(ValidationError::InvalidStride);
        }
        self.classes.validate()
    }

    /// Folder the project will live in.
    pub fn project_root(&self) -> PathBuf {
        self.destination_root.join(&self.name)
    }
}

/// A created project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub video_file: PathBuf,
    /// Folder holding `frames/`, `labels/` and `resized/`. Derived from where
    /// the manifest was found, so it is never written out.
    #[serde(skip)]
    pub root_folder: PathBuf,
    pub classes: ClassTable,
    pub frame_extraction_stride: u32,
    pub video: Option<VideoProperties>,
    #[serde(default)]
    pub extracted_count: usize,
}

impl Project {
    pub fn from_request(request: &NewProject) -> Self {
        Self {
            name: request.name.clone(),
            video_file: request.video_file.clone(),
            root_folder: request.project_root(),
            classes: request.classes.clone(),
            frame_extraction_stride: request.frame_extraction_stride,
            video: None,
            extracted_count: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_folder
    }

    /// File name of the source video, for display.
    pub fn video_file_name(&self) -> String {
        self.video_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
