// src/settings.rs
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::cell_render::DEFAULT_DATE_FORMAT;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5600/upload";
pub const ENDPOINT_ENV: &str = "SHEET_VIEWER_ENDPOINT";

const CONFIG_FILE: &str = "config.json";
const THEME_FILE: &str = "theme";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ThemeStoreError {
    #[error("could not determine app data directory")]
    NoAppDataDir,
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "sheetviewer", "Sheet Viewer")
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub endpoint: String,
    pub date_format: String,
    pub notification_secs: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            notification_secs: 5,
        }
    }
}

impl ViewerConfig {
    /// Reads `config.json` from the platform config directory and applies the
    /// endpoint override from the environment. Never fails: problems are
    /// logged and defaults are used.
    pub fn load() -> Self {
        let mut config = match project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE)) {
            Some(path) => match Self::from_file(&path) {
                Ok(Some(config)) => config,
                Ok(None) => ViewerConfig::default(),
                Err(e) => {
                    log::warn!("ignoring {}: {}", path.display(), e);
                    ViewerConfig::default()
                }
            },
            None => ViewerConfig::default(),
        };

        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            config.apply_endpoint_override(&endpoint);
        }
        config
    }

    /// `Ok(None)` when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn apply_endpoint_override(&mut self, endpoint: &str) {
        let endpoint = endpoint.trim();
        if !endpoint.is_empty() {
            self.endpoint = endpoint.to_string();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dark" => Some(ThemeMode::Dark),
            "light" => Some(ThemeMode::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }
}

/// Persists the theme preference as `"dark"` or `"light"`.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: PathBuf) -> Self {
        ThemeStore { path }
    }

    pub fn open_default() -> Result<Self, ThemeStoreError> {
        let dirs = project_dirs().ok_or(ThemeStoreError::NoAppDataDir)?;
        Ok(Self::new(dirs.data_local_dir().join(THEME_FILE)))
    }

    /// The stored preference, or the default when nothing usable is stored.
    pub fn load(&self) -> ThemeMode {
        match fs::read_to_string(&self.path) {
            Ok(value) => ThemeMode::parse(&value).unwrap_or_else(|| {
                log::warn!("unrecognised theme {:?} in {}", value.trim(), self.path.display());
                ThemeMode::default()
            }),
            Err(_) => ThemeMode::default(),
        }
    }

    pub fn save(&self, mode: ThemeMode) -> Result<(), ThemeStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, mode.as_str())?;
        Ok(())
    }
}
