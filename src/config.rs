//! User settings from `<config dir>/ghist/config.json`.
//!
//! Every field is optional. Command-line flags override what is found here.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Default number of commits loaded per query.
pub const DEFAULT_LIMIT: usize = 256;

/// Cached config directory path.
static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get the ghist config directory (cached).
pub fn config_dir() -> &'static Path {
    CONFIG_DIR.get_or_init(|| {
        directories::ProjectDirs::from("", "", "ghist")
            .map(|d| d.config_dir().to_path_buf())
            .unwrap_or_else(dirs_fallback)
    })
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(|h| Path::new(&h).join(".config").join("ghist"))
        .unwrap_or_else(|_| PathBuf::from(".ghist"))
}

/// Presentation layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Commit list beside the detail pane.
    #[default]
    Split,
    /// Detail pane only; commits are stepped with the arrow keys.
    Detail,
}

/// Persisted settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    /// Theme name.
    pub theme: Option<String>,
    /// Preferred layout.
    pub layout: Option<LayoutKind>,
    /// Commit limit.
    pub limit: Option<usize>,
    /// Follow files across renames.
    pub follow_renames: Option<bool>,
}

impl Settings {
    /// Path of the settings file.
    pub fn path() -> PathBuf {
        config_dir().join("config.json")
    }

    /// Load settings from the default location.
    ///
    /// A missing file yields defaults; an unreadable or invalid one is logged and
    /// ignored.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load settings from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable settings file");
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(settings) => {
                tracing::debug!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid settings file");
                Self::default()
            }
        }
    }

    /// Effective commit limit, at least 1.
    pub fn limit_or_default(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).max(1)
    }

    /// Effective rename following.
    pub fn follow_or_default(&self) -> bool {
        self.follow_renames.unwrap_or(true)
    }
}
