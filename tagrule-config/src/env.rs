// Environment variable loading

use crate::{ConfigError, Result, SettingsOverlay, ValidationSettings};
use std::collections::HashMap;
use std::env::{self, VarError};
use std::ffi::OsString;

/// Prefix of the environment variables read by default
pub const DEFAULT_PREFIX: &str = "TAGRULE";

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load all environment variables carrying the prefix, keyed by the
    /// setting name (`TAGRULE_DATE_LAYOUT` -> `date_layout`)
    pub fn load(&self) -> Result<HashMap<String, String>> {
        Self::filter_prefixed(self.prefix.as_deref(), env::vars_os())
    }

    /// Read the prefixed variables into an overlay
    pub fn overlay(&self) -> Result<SettingsOverlay> {
        let mut overlay = SettingsOverlay::default();
        apply_map(&mut overlay, &self.load()?)?;
        Ok(overlay)
    }

    /// Apply every recognized prefixed variable to `settings`.
    ///
    /// Returns the number of settings that were overridden.
    pub fn apply(&self, settings: &mut ValidationSettings) -> Result<usize> {
        let mut overlay = SettingsOverlay::default();
        let applied = apply_map(&mut overlay, &self.load()?)?;
        overlay.apply_to(settings);
        Ok(applied)
    }

    fn filter_prefixed(
        prefix: Option<&str>,
        vars: impl IntoIterator<Item = (OsString, OsString)>,
    ) -> Result<HashMap<String, String>> {
        let mut config = HashMap::new();

        for (key, value) in vars {
            // Names outside UTF-8 cannot carry the prefix
            let Some(key) = key.to_str() else {
                continue;
            };

            let name = match prefix {
                Some(prefix) => match key.strip_prefix(prefix) {
                    Some(rest) => rest.trim_start_matches('_'),
                    None => continue,
                },
                None => key,
            };
            if name.is_empty() {
                continue;
            }

            let value = value
                .into_string()
                .map_err(|raw| ConfigError::EnvError(VarError::NotUnicode(raw)))?;
            config.insert(setting_key(name), value);
        }

        Ok(config)
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(DEFAULT_PREFIX.to_string()))
    }
}

/// Normalize a raw variable name to a setting key.
///
/// The setting name is lowercased; a validator name after
/// `ERROR_MESSAGES.` keeps its case.
pub(crate) fn setting_key(raw: &str) -> String {
    match raw.split_once('.') {
        Some((section, name)) => format!("{}.{}", section.to_lowercase(), name),
        None => raw.to_lowercase(),
    }
}

/// Record a key/value map in an overlay, ignoring unknown keys.
pub(crate) fn apply_map(
    overlay: &mut SettingsOverlay,
    vars: &HashMap<String, String>,
) -> Result<usize> {
    let mut keys: Vec<&String> = vars.keys().collect();
    keys.sort();

    let mut applied = 0;
    for key in keys {
        if overlay.set(key, &vars[key])? {
            tracing::debug!(setting = %key, "setting overridden");
            applied += 1;
        }
    }
    Ok(applied)
}
