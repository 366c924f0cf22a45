//! Settings storage
//!
//! Manages persistence of the server endpoint and sampling defaults. The
//! settings file is merged with defaults on load so older or partial files
//! keep working.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::client::DEFAULT_BASE_URL;
use crate::storage::{get_data_dir, StorageError};
use crate::types::api::SamplingOptions;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Base URL of the model server
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Model preselected for new conversations
    #[serde(default)]
    pub default_model: Option<String>,
    /// Temperature parameter for text generation (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Top-p (nucleus sampling) parameter (0.0 - 1.0)
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    /// Top-k sampling parameter
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Repeat penalty parameter
    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f32,
}

fn default_server_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_top_k() -> u32 {
    40
}

fn default_repeat_penalty() -> f32 {
    1.1
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            default_model: None,
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            repeat_penalty: default_repeat_penalty(),
        }
    }
}

impl AppSettings {
    /// Validate settings values
    ///
    /// Ensures all parameters are within acceptable ranges.
    pub fn validate(&mut self) {
        self.temperature = self.temperature.clamp(0.0, 2.0);
        self.top_p = self.top_p.clamp(0.0, 1.0);

        if self.top_k == 0 {
            self.top_k = default_top_k();
        }

        if self.repeat_penalty <= 0.0 {
            self.repeat_penalty = default_repeat_penalty();
        }

        if self.server_url.trim().is_empty() {
            self.server_url = default_server_url();
        } else {
            self.server_url = self.server_url.trim().trim_end_matches('/').to_string();
        }
    }

    /// Sampling options to attach to generate/chat requests
    pub fn sampling_options(&self) -> SamplingOptions {
        SamplingOptions {
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            top_k: Some(self.top_k),
            repeat_penalty: Some(self.repeat_penalty),
        }
    }
}

/// Get the settings file path
fn get_settings_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("settings.json"))
}

/// Load settings from disk
///
/// Returns default settings if the file doesn't exist or is corrupted
pub fn load_settings() -> AppSettings {
    match load_settings_internal() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            AppSettings::default()
        }
    }
}

/// Internal settings loading with error propagation
fn load_settings_internal() -> Result<AppSettings, StorageError> {
    let path = get_settings_path()?;

    if !path.exists() {
        tracing::info!("Settings file not found, using defaults");
        return Ok(AppSettings::default());
    }

    let json = fs::read_to_string(&path)?;
    let mut settings: AppSettings = serde_json::from_str(&json)?;
    settings.validate();

    tracing::debug!("Loaded settings from disk");
    Ok(settings)
}

/// Save settings to disk
pub fn save_settings(settings: &AppSettings) -> Result<(), StorageError> {
    let path = get_settings_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;

    tracing::debug!("Saved settings to disk");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.server_url, "http://localhost:11434");
        assert_eq!(settings.temperature, 0.7);
        assert_eq!(settings.top_p, 0.9);
        assert_eq!(settings.top_k, 40);
        assert!(settings.default_model.is_none());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = AppSettings::default();

        settings.temperature = 5.0;
        settings.validate();
        assert_eq!(settings.temperature, 2.0);

        settings.top_p = 2.0;
        settings.validate();
        assert_eq!(settings.top_p, 1.0);

        settings.server_url = "   ".to_string();
        settings.validate();
        assert_eq!(settings.server_url, "http://localhost:11434");

        settings.server_url = "http://192.168.1.5:11434/".to_string();
        settings.validate();
        assert_eq!(settings.server_url, "http://192.168.1.5:11434");
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let json = r#"{"server_url": "http://box:11434", "temperature": 0.3}"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.server_url, "http://box:11434");
        assert_eq!(settings.temperature, 0.3);
        // unspecified fields fall back to defaults
        assert_eq!(settings.top_k, 40);
        assert_eq!(settings.repeat_penalty, 1.1);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = AppSettings::default();
        let json = serde_json::to_string_pretty(&settings).unwrap();
        let mut loaded: AppSettings = serde_json::from_str(&json).unwrap();
        loaded.validate();
        assert_eq!(settings.temperature, loaded.temperature);
        assert_eq!(settings.server_url, loaded.server_url);
    }

    #[test]
    fn test_sampling_options_from_settings() {
        let settings = AppSettings::default();
        let options = settings.sampling_options();
        assert_eq!(options.temperature, Some(0.7));
        assert_eq!(options.top_k, Some(40));
    }
}
