//! Configuration file management.
//!
//! Reads `.backstop.toml`, discovered by walking up from the working
//! directory, so a project checkout can pin its project name, default
//! environment and store location without flags on every call. Flags and
//! environment variables always win over the file; precedence is applied
//! by the CLI layer.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::core::constants::CONFIG_FILE;
use crate::error::{Error, Result};

/// Contents of `.backstop.toml`. Every field is optional; missing values
/// fall back to environment variables or CLI defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub project: Option<String>,
    pub environment: Option<String>,
    /// Store document path, relative to the config file's directory.
    pub store: Option<PathBuf>,
}

impl Config {
    /// Load a config file from an explicit path.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;

        // Anchor a relative store path at the config file, not the cwd.
        if let (Some(store), Some(dir)) = (&config.store, path.parent()) {
            if store.is_relative() {
                config.store = Some(dir.join(store));
            }
        }
        Ok(config)
    }

    /// Walk up from `start` looking for a config file.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(CONFIG_FILE);
            if candidate.is_file() {
                return Self::load(&candidate).map(Some);
            }
            dir = current.parent();
        }
        Ok(None)
    }

    /// Walk up from the current working directory.
    pub fn discover() -> Result<Option<Self>> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// The project name, which has no flag-independent default.
    pub fn require_project(config: Option<&Self>) -> Result<String> {
        config
            .and_then(|c| c.project.clone())
            .ok_or(Error::NoConfig)
    }
}
