//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Tracking thresholds (weak-signal accuracy, minimum run distance)
//! - Food database endpoint and cache lifetime
//! - Cloud backend endpoints and sync interval
//! - Theme pass-through for front-ends (font family, size, dark mode)
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::tracking::{TrackerSettings, DEFAULT_STEP_LENGTH_FACTOR, DEFAULT_WEAK_SIGNAL_ACCURACY_M};

/// Run tracking tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_weak_signal_accuracy")]
    pub weak_signal_accuracy_m: f64,
    #[serde(default = "default_min_run_distance")]
    pub min_run_distance_m: f64,
    #[serde(default = "default_step_length_factor")]
    pub step_length_factor: f64,
    #[serde(default = "default_calories_per_meter")]
    pub calories_per_meter: f64,
    #[serde(default = "default_fix_interval")]
    pub fix_interval_secs: u64,
}

/// Open Food Facts client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodApiConfig {
    #[serde(default = "default_food_base_url")]
    pub base_url: String,
    #[serde(default = "default_food_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_page_size")]
    pub search_page_size: u32,
}

/// Cloud backend configuration. Sync is disabled while `database_url` or
/// `api_key` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    #[serde(default)]
    pub database_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_auto_sync_interval")]
    pub auto_sync_interval_secs: u64,
}

/// Theme values handed to whichever front-end renders the app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default)]
    pub dark_mode: bool,
}

impl UiConfig {
    /// Colour scheme a front-end should render with.
    pub fn scheme(&self) -> &'static str {
        if self.dark_mode {
            "dark"
        } else {
            "light"
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub food_api: FoodApiConfig,
    #[serde(default)]
    pub cloud: CloudConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Where this config was loaded from; `save` writes back here.
    #[serde(skip)]
    path: Option<PathBuf>,
}

// Default functions
fn default_weak_signal_accuracy() -> f64 {
    DEFAULT_WEAK_SIGNAL_ACCURACY_M
}
fn default_min_run_distance() -> f64 {
    100.0
}
fn default_step_length_factor() -> f64 {
    DEFAULT_STEP_LENGTH_FACTOR
}
fn default_calories_per_meter() -> f64 {
    0.05
}
fn default_fix_interval() -> u64 {
    2
}
fn default_food_base_url() -> String {
    "https://world.openfoodfacts.org".into()
}
fn default_food_timeout() -> u64 {
    10
}
fn default_cache_ttl() -> u64 {
    3600
}
fn default_user_agent() -> String {
    "HealthTrack/1.0".into()
}
fn default_page_size() -> u32 {
    10
}
fn default_auth_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".into()
}
fn default_connect_timeout() -> u64 {
    5
}
fn default_auto_sync_interval() -> u64 {
    30
}
fn default_font_size() -> u32 {
    15
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            weak_signal_accuracy_m: default_weak_signal_accuracy(),
            min_run_distance_m: default_min_run_distance(),
            step_length_factor: default_step_length_factor(),
            calories_per_meter: default_calories_per_meter(),
            fix_interval_secs: default_fix_interval(),
        }
    }
}

impl Default for FoodApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_food_base_url(),
            timeout_secs: default_food_timeout(),
            cache_ttl_secs: default_cache_ttl(),
            user_agent: default_user_agent(),
            search_page_size: default_page_size(),
        }
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            api_key: String::new(),
            auth_url: default_auth_url(),
            connect_timeout_secs: default_connect_timeout(),
            auto_sync_interval_secs: default_auto_sync_interval(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: default_font_size(),
            dark_mode: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig::default(),
            food_api: FoodApiConfig::default(),
            cloud: CloudConfig::default(),
            ui: UiConfig::default(),
            path: None,
        }
    }
}

impl FoodApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl CloudConfig {
    pub fn is_configured(&self) -> bool {
        !self.database_url.trim().is_empty() && !self.api_key.trim().is_empty()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Optional fields serialize as null; an empty value clears them.
                    serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location: `<data dir>/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.path = Some(path.to_path_buf());
                Ok(cfg)
            }
            Err(_) => {
                let mut cfg = Self::default();
                cfg.path = Some(path.to_path_buf());
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Persist to the path this config was loaded from, or the default one.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = match &self.path {
            Some(p) => p.clone(),
            None => Self::default_path()?,
        };
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.clone(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(&path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dotted key and save. The value keeps the type of the
    /// existing field.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let mut updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.path = self.path.take();
        *self = updated;
        self.save()
    }

    /// Restore defaults and save, keeping the file location.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        let path = self.path.take();
        *self = Self::default();
        self.path = path;
        self.save()
    }

    /// Every leaf as `(dotted.key, value)`, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out.sort();
        out
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            weak_signal_accuracy_m: self.tracking.weak_signal_accuracy_m,
            min_run_distance_m: self.tracking.min_run_distance_m,
            calories_per_meter: self.tracking.calories_per_meter,
            fix_interval_secs: self.tracking.fix_interval_secs as f64,
        }
    }
}
