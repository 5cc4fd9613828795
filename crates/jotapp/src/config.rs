//! # Configuration
//!
//! Jot configuration is managed by [`confique`], layering environment variables over
//! an optional TOML file over compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `JOT_DATA_DIR`, `JOT_QUOTA_BYTES`, `JOT_MAX_AUDIO_BYTES`,
//!    `JOT_AUDIO_MEDIA_TYPE`.
//! 2. **Config file**: `jot.toml` in the OS config directory (via `directories`).
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir | Where the file backend keeps its values |
//! | `quota_bytes` | `5242880` | Total bytes the backend accepts (keys + values) |
//! | `max_audio_bytes` | `4194304` | Largest recording accepted for encoding |
//! | `audio_media_type` | `audio/wav` | Media type recorded in new voice memos |
//! | `notes_key` | `notes` | Key holding the note collection |

use crate::error::{JotError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_MAX_AUDIO_BYTES: usize = 4 * 1024 * 1024;

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JotConfig {
    /// Directory for stored values. Defaults to the OS data directory.
    #[config(env = "JOT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[config(env = "JOT_QUOTA_BYTES", default = 5242880)]
    pub quota_bytes: usize,

    #[config(env = "JOT_MAX_AUDIO_BYTES", default = 4194304)]
    pub max_audio_bytes: usize,

    #[config(env = "JOT_AUDIO_MEDIA_TYPE", default = "audio/wav")]
    pub audio_media_type: String,

    #[config(default = "notes")]
    pub notes_key: String,
}

impl Default for JotConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
            audio_media_type: crate::audio::DEFAULT_MEDIA_TYPE.to_string(),
            notes_key: crate::store::NOTES_KEY.to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "jot")
}

/// `jot.toml` in the platform config directory, if one can be determined.
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("jot.toml"))
}

impl JotConfig {
    /// Load from the environment and the default config file.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_file().as_deref())
    }

    /// Load from the environment and, when given, a specific TOML file.
    /// A missing file is skipped.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        let config = builder
            .load()
            .map_err(|e| JotError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.notes_key.is_empty() {
            return Err(JotError::Config("notes_key must not be empty".to_string()));
        }
        if self.notes_key == crate::store::SETTINGS_KEY {
            return Err(JotError::Config(format!(
                "notes_key must not be the settings key \"{}\"",
                crate::store::SETTINGS_KEY
            )));
        }
        Ok(())
    }

    /// Configured data directory, falling back to the OS data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .ok_or_else(|| JotError::Config("could not determine a data directory".to_string()))
    }
}
