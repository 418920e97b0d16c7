//! Console configuration.
//!
//! Settings are read from an optional `settings.json` next to the session
//! store, then overridden by command-line flags or environment variables.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default backend URL.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Directory name under the platform config dir.
const APP_DIR: &str = "roster-sync";

/// Settings filename.
const SETTINGS_FILE: &str = "settings.json";

/// Session store filename.
const SESSION_FILE: &str = "session.json";

/// Console configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the roster backend.
    pub api_url: String,

    /// Request timeout in seconds. `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Where the session credential is persisted.
    pub store_path: PathBuf,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: None,
            store_path: default_config_dir().join(SESSION_FILE),
        }
    }
}

impl ConsoleConfig {
    /// Load settings from `dir/settings.json`, using defaults if not found.
    ///
    /// A store path that is not set in the file defaults to `dir/session.json`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, AppError> {
        let path = dir.join(SETTINGS_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str::<serde_json::Value>(&text).map_err(|e| {
                AppError::invalid_input_field(
                    format!("Failed to parse {}: {}", path.display(), e),
                    "settings",
                )
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => serde_json::json!({}),
            Err(e) => return Err(e.into()),
        };

        let explicit_store = raw.get("store_path").is_some();
        let mut config: ConsoleConfig = serde_json::from_value(raw).map_err(|e| {
            AppError::invalid_input_field(
                format!("Invalid settings in {}: {}", path.display(), e),
                "settings",
            )
        })?;

        if !explicit_store {
            config.store_path = dir.join(SESSION_FILE);
        }

        Ok(config)
    }

    /// Load settings from the platform config directory.
    pub fn load() -> Result<Self, AppError> {
        Self::load_from_dir(&default_config_dir())
    }

    /// Apply overrides from flags or environment.
    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        timeout_secs: Option<u64>,
        store_path: Option<PathBuf>,
    ) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if timeout_secs.is_some() {
            self.timeout_secs = timeout_secs;
        }
        if let Some(path) = store_path {
            self.store_path = path;
        }
        self
    }
}

/// Platform config directory for the console, falling back to the working directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
