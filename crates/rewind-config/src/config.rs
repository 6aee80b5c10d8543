/// Application configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use rewind_mod_history::config::{resolve_data_dir, MIN_HISTORY_DEPTH};
use rewind_mod_history::HistoryConfig;
use serde::{Deserialize, Serialize};

/// Upper bound for `max_history_depth`.
const MAX_HISTORY_DEPTH_LIMIT: usize = 100_000;

/// Log levels accepted by `log_level`.
const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Max undo checkpoints kept per project.
    pub max_history_depth: usize,
    /// Whether history changes are autosaved for crash recovery.
    pub autosave_enabled: bool,
    /// Directory holding the autosave database. Empty = default location.
    /// A leading `~` expands to the user's home directory.
    pub data_dir: String,
    /// Default log filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_history_depth: 1_000,
            autosave_enabled: true,
            data_dir: String::new(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Returns the config file path: exe directory + `rewind.json`.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("rewind.json")))
            .unwrap_or_else(|| PathBuf::from("rewind.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<AppConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Return defaults on error (don't overwrite broken file)
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.max_history_depth = self
            .max_history_depth
            .clamp(MIN_HISTORY_DEPTH, MAX_HISTORY_DEPTH_LIMIT);

        let level = self.log_level.trim().to_ascii_lowercase();
        self.log_level = if VALID_LOG_LEVELS.contains(&level.as_str()) {
            level
        } else {
            "info".to_string()
        };
        self.data_dir = self.data_dir.trim().to_string();
    }

    /// Returns the effective autosave directory.
    ///
    /// Resolution order:
    /// 1. `data_dir` (with `~` expanded), if non-empty
    /// 2. `REWIND_DATA_DIR` environment variable
    /// 3. `.data/` next to the executable
    pub fn resolve_data_dir(&self) -> PathBuf {
        if self.data_dir.is_empty() {
            return resolve_data_dir();
        }
        if let Some(rest) = self.data_dir.strip_prefix('~') {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest.trim_start_matches(['/', '\\']));
            }
        }
        PathBuf::from(&self.data_dir)
    }

    /// History settings derived from this config.
    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            max_history_depth: self.max_history_depth,
            autosave_enabled: self.autosave_enabled,
            data_dir: self.resolve_data_dir(),
        }
    }
}
