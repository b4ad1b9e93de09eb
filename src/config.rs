use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::predict::SuggestionTables;

pub const CONFIG_ENV: &str = "GODSPEED_CONFIG";

fn default_table_name() -> String {
    "Tasks".into()
}

fn default_users_table() -> String {
    "Discord Users".into()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown setting {0:?}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Persisted connection and identity settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Plain-text fallback; the keyring copy is preferred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_id: String,
    pub table_name: String,
    pub users_table: String,
    /// Chat-platform id of whoever uses this machine.
    pub current_user_external_id: Option<String>,
    pub debug_logging: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Overrides the built-in role and priority tables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<SuggestionTables>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_id: String::new(),
            table_name: default_table_name(),
            users_table: default_users_table(),
            current_user_external_id: None,
            debug_logging: false,
            api_url: None,
            suggestions: None,
        }
    }
}

impl Settings {
    /// `$GODSPEED_CONFIG`, else `<config dir>/godspeed/settings.json`.
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("godspeed")
            .join("settings.json")
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Base id present; the key may still come from the keyring.
    pub fn has_base(&self) -> bool {
        !self.base_id.trim().is_empty()
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user_external_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn suggestion_tables(&self) -> SuggestionTables {
        self.suggestions.clone().unwrap_or_default()
    }

    /// Set one field by its JSON name. Empty values clear optional fields.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let optional = |v: &str| (!v.trim().is_empty()).then(|| v.trim().to_string());
        match key {
            "api_key" => self.api_key = optional(value),
            "base_id" => self.base_id = value.trim().to_string(),
            "table_name" => {
                self.table_name = optional(value).unwrap_or_else(default_table_name)
            }
            "users_table" => {
                self.users_table = optional(value).unwrap_or_else(default_users_table)
            }
            "current_user_external_id" => self.current_user_external_id = optional(value),
            "api_url" => self.api_url = optional(value),
            "debug_logging" => {
                self.debug_logging = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}
