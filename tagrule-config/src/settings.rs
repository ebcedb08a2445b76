// Validation context settings

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default pattern for the `Email` validator
pub const DEFAULT_EMAIL_FORMAT: &str = r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$";

/// Default pattern for the `Phone` validator
pub const DEFAULT_PHONE_FORMAT: &str = r"^([62]|[0])[0-9]+$";

/// Default chrono layout used by `Date` and `AfterDate`
pub const DEFAULT_DATE_LAYOUT: &str = "%m/%d/%Y";

/// Human-readable form of [`DEFAULT_DATE_LAYOUT`], used in error text
pub const DEFAULT_DATE_FORMAT: &str = "mm/dd/yyyy";

/// What happens to errors produced by records nested inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedPolicy {
    /// Nested records are validated but their outcome is discarded
    #[default]
    Legacy,
    /// Nested errors are merged into the parent result
    Merge,
}

impl FromStr for NestedPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(NestedPolicy::Legacy),
            "merge" => Ok(NestedPolicy::Merge),
            other => Err(ConfigError::invalid(
                "nested",
                format!("expected `legacy` or `merge`, got `{}`", other),
            )),
        }
    }
}

impl fmt::Display for NestedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NestedPolicy::Legacy => f.write_str("legacy"),
            NestedPolicy::Merge => f.write_str("merge"),
        }
    }
}

/// How rule metadata strings are parsed during validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Malformed fragments are ignored
    #[default]
    Lenient,
    /// Malformed fragments abort validation with a parse error
    Strict,
}

impl FromStr for ParseMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(ParseMode::Lenient),
            "strict" => Ok(ParseMode::Strict),
            other => Err(ConfigError::invalid(
                "parse_mode",
                format!("expected `lenient` or `strict`, got `{}`", other),
            )),
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMode::Lenient => f.write_str("lenient"),
            ParseMode::Strict => f.write_str("strict"),
        }
    }
}

/// Everything a validation context is built from.
///
/// Every key is optional in files; missing keys take the defaults.
///
/// ```toml
/// email_format = '^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$'
/// date_layout = "%d/%m/%Y"
/// date_format = "dd/mm/yyyy"
/// nested = "merge"
///
/// [error_messages]
/// Required = "Fields is required"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub email_format: String,
    pub phone_format: String,
    pub date_format: String,
    pub date_layout: String,
    pub nested: NestedPolicy,
    pub parse_mode: ParseMode,
    /// Validator name to default message
    pub error_messages: BTreeMap<String, String>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            email_format: DEFAULT_EMAIL_FORMAT.to_string(),
            phone_format: DEFAULT_PHONE_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            date_layout: DEFAULT_DATE_LAYOUT.to_string(),
            nested: NestedPolicy::default(),
            parse_mode: ParseMode::default(),
            error_messages: BTreeMap::new(),
        }
    }
}

impl ValidationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one `key = value` override.
    ///
    /// Keys are the lowercase setting names; `error_messages.<Validator>` sets a
    /// single override message. Unknown keys are reported back as `false`.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<bool> {
        let mut overlay = SettingsOverlay::default();
        if !overlay.set(key, value)? {
            return Ok(false);
        }
        overlay.apply_to(self);
        Ok(true)
    }

    pub fn with_error_message(mut self, validator: impl Into<String>, message: impl Into<String>) -> Self {
        self.error_messages.insert(validator.into(), message.into());
        self
    }

    pub fn with_nested(mut self, nested: NestedPolicy) -> Self {
        self.nested = nested;
        self
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn with_date(mut self, format: impl Into<String>, layout: impl Into<String>) -> Self {
        self.date_format = format.into();
        self.date_layout = layout.into();
        self
    }
}

/// One settings source: only the keys it actually sets.
///
/// Files and environment variables are read into overlays and applied in
/// order, so a later source can put a value back to its default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SettingsOverlay {
    pub email_format: Option<String>,
    pub phone_format: Option<String>,
    pub date_format: Option<String>,
    pub date_layout: Option<String>,
    pub nested: Option<NestedPolicy>,
    pub parse_mode: Option<ParseMode>,
    pub error_messages: BTreeMap<String, String>,
}

impl SettingsOverlay {
    /// Record one `key = value` pair; `false` for unknown keys
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            "email_format" => self.email_format = Some(value.to_string()),
            "phone_format" => self.phone_format = Some(value.to_string()),
            "date_format" => self.date_format = Some(value.to_string()),
            "date_layout" => self.date_layout = Some(value.to_string()),
            "nested" => self.nested = Some(value.parse()?),
            "parse_mode" => self.parse_mode = Some(value.parse()?),
            _ => match key.strip_prefix("error_messages.") {
                Some(name) if !name.is_empty() => {
                    self.error_messages
                        .insert(name.to_string(), value.to_string());
                }
                _ => return Ok(false),
            },
        }
        Ok(true)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write every key this overlay sets into `settings`
    pub fn apply_to(self, settings: &mut ValidationSettings) {
        if let Some(value) = self.email_format {
            settings.email_format = value;
        }
        if let Some(value) = self.phone_format {
            settings.phone_format = value;
        }
        if let Some(value) = self.date_format {
            settings.date_format = value;
        }
        if let Some(value) = self.date_layout {
            settings.date_layout = value;
        }
        if let Some(value) = self.nested {
            settings.nested = value;
        }
        if let Some(value) = self.parse_mode {
            settings.parse_mode = value;
        }
        settings.error_messages.extend(self.error_messages);
    }
}
