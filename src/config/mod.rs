use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::constants::{
    DEFAULT_REQUEST_TIMEOUT_SECS, INITIAL_RECONNECT_DELAY_MS, MAX_RECONNECT_ATTEMPTS,
};

/// Environment variable overriding the REST base URL
pub const API_URL_ENV: &str = "DENGUEWATCH_API_URL";
/// Environment variable overriding the notification WebSocket URL
pub const WS_URL_ENV: &str = "DENGUEWATCH_WS_URL";
/// Environment variable holding the access token (never persisted)
pub const TOKEN_ENV: &str = "DENGUEWATCH_TOKEN";

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfigData {
    /// Base URL of the REST backend
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Notification WebSocket endpoint (token is appended as a query parameter)
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// Serve dashboard data from the built-in samples instead of the backend
    #[serde(default)]
    pub use_mock_data: bool,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Where exports are written (falls back to the platform download folder)
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    #[serde(default)]
    pub map: MapDefaults,

    #[serde(default)]
    pub reconnect: ReconnectSettings,
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            ws_url: default_ws_url(),
            use_mock_data: false,
            request_timeout_secs: default_request_timeout_secs(),
            export_dir: None,
            map: MapDefaults::default(),
            reconnect: ReconnectSettings::default(),
        }
    }
}

/// Initial map view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDefaults {
    /// `[lng, lat]`
    pub center: [f64; 2],
    pub zoom: f64,
}

impl Default for MapDefaults {
    fn default() -> Self {
        // Centre of Brazil
        Self {
            center: [-47.9292, -15.7801],
            zoom: 5.0,
        }
    }
}

/// Notification reconnect behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectSettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RECONNECT_ATTEMPTS,
            initial_delay_ms: INITIAL_RECONNECT_DELAY_MS,
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:8000/ws/notificacoes".to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Runtime configuration
#[derive(Debug)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

impl AppConfig {
    /// Directory exports should be written to
    pub fn export_dir(&self) -> PathBuf {
        self.data
            .export_dir
            .clone()
            .unwrap_or_else(crate::paths::default_export_dir)
    }

    /// Change the export directory and flag the config for saving
    pub fn set_export_dir(&mut self, dir: PathBuf) {
        info!("Set export directory to {:?}", dir);
        self.data.export_dir = Some(dir);
        self.dirty = true;
    }

    /// Persist the config if anything changed since the last save
    pub fn save_if_dirty(&mut self) {
        if self.dirty {
            save_config(self);
            self.dirty = false;
        }
    }
}

/// Result of loading config from disk
pub struct LoadConfigResult {
    pub config: AppConfig,
    /// Error message if config was reset to defaults due to an error
    pub reset_reason: Option<String>,
}

/// Load configuration from the platform config path
pub fn load_config() -> LoadConfigResult {
    load_config_from(&crate::paths::config_file())
}

/// Load configuration from disk, falling back to defaults on any error
pub fn load_config_from(config_path: &Path) -> LoadConfigResult {
    let (mut data, reset_reason) = if config_path.exists() {
        match std::fs::read_to_string(config_path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", config_path);
                    (data, None)
                }
                Err(e) => {
                    warn!("Failed to parse config file: {}", e);
                    (
                        AppConfigData::default(),
                        Some(format!("Configuration file was corrupted: {}", e)),
                    )
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (AppConfigData::default(), None)
    };

    apply_env_overrides(&mut data, |key| std::env::var(key).ok());

    LoadConfigResult {
        config: AppConfig {
            data,
            config_path: config_path.to_path_buf(),
            dirty: false,
        },
        reset_reason,
    }
}

/// Apply URL overrides from the environment on top of the loaded values
fn apply_env_overrides(data: &mut AppConfigData, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
        info!("{API_URL_ENV} set, using {url}");
        data.api_base_url = url;
    }
    if let Some(url) = lookup(WS_URL_ENV).filter(|v| !v.trim().is_empty()) {
        info!("{WS_URL_ENV} set, using {url}");
        data.ws_url = url;
    }
}

/// Access token supplied through the environment, if any
pub fn access_token() -> Option<String> {
    std::env::var(TOKEN_ENV)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Save configuration to disk
pub fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}
