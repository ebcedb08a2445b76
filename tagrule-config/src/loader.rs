// Settings file loaders

use crate::env::{apply_map, setting_key};
use crate::{ConfigError, Result, SettingsOverlay, ValidationSettings};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Supported settings file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }
}

/// Settings file loader
pub struct ConfigLoader {
    format: FileFormat,
}

impl ConfigLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::LoadError("No file extension found".to_string()))?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::LoadError(format!("Unsupported format: {}", ext)))?;

        Ok(Self::new(format))
    }

    /// Load settings from file, missing keys taking the defaults
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ValidationSettings> {
        let mut settings = ValidationSettings::default();
        self.load_overlay(path)?.apply_to(&mut settings);
        Ok(settings)
    }

    /// Load only the keys a file sets
    pub fn load_overlay(&self, path: impl AsRef<Path>) -> Result<SettingsOverlay> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), format = ?self.format, "loading validation settings");
        self.parse_overlay(&content)
    }

    /// Parse settings from string
    pub fn parse(&self, content: &str) -> Result<ValidationSettings> {
        let mut settings = ValidationSettings::default();
        self.parse_overlay(content)?.apply_to(&mut settings);
        Ok(settings)
    }

    /// Parse only the keys present in `content`
    pub fn parse_overlay(&self, content: &str) -> Result<SettingsOverlay> {
        match self.format {
            FileFormat::Json => self.parse_json(content),
            FileFormat::Toml => self.parse_toml(content),
            FileFormat::Env => self.parse_env(content),
        }
    }

    fn parse_json(&self, content: &str) -> Result<SettingsOverlay> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))
    }

    fn parse_toml(&self, content: &str) -> Result<SettingsOverlay> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))
    }

    /// `KEY=value` lines; keys may carry the `TAGRULE_` prefix
    fn parse_env(&self, content: &str) -> Result<SettingsOverlay> {
        let mut map = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let key = key
                    .strip_prefix(crate::env::DEFAULT_PREFIX)
                    .map(|rest| rest.trim_start_matches('_'))
                    .unwrap_or(key);
                let value = value.trim().trim_matches('"').trim_matches('\'');
                map.insert(setting_key(key), value.to_string());
            }
        }

        let mut overlay = SettingsOverlay::default();
        apply_map(&mut overlay, &map)?;
        Ok(overlay)
    }
}
