// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings are loaded once in `main` and handed to whoever needs them; the
//! core never reads them on its own.

use crate::error::Result;
use crate::session::playback::DEFAULT_INTERVAL_MS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "VIDEO_ANNOTATOR_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "settings.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme: Theme,
    /// Folder the video picker starts in.
    pub source_folder: Option<PathBuf>,
    /// Folder new projects are created under.
    pub project_folder: Option<PathBuf>,
    pub default_stride: u32,
    pub playback_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            source_folder: None,
            project_folder: None,
            default_stride: 1,
            playback_interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl AppConfig {
    /// Where settings are read from and written to.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Read settings, falling back to defaults when the file is missing or
    /// cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&yaml)?;
        config.default_stride = config.default_stride.max(1);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("nope.yaml"));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.playback_interval_ms, 100);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "theme: light\ndefault_stride: 0\n").unwrap();

        let config = AppConfig::load_or_default(&path);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.default_stride, 1);
        assert_eq!(config.playback_interval_ms, 100);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        let config = AppConfig {
            project_folder: Some(dir.path().to_path_buf()),
            default_stride: 5,
            ..AppConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_garbage_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "theme: [not, a, theme").unwrap();
        assert_eq!(AppConfig::load_or_default(&path), AppConfig::default());
    }

    #[test]
    fn test_resized_edge_is_not_configurable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "resize_edge: 64\ndefault_stride: 3\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.default_stride, 3);
        config.save(&path).unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("resize_edge"));
    }
}
