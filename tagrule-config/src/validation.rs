// Settings validation

use crate::{ConfigError, Result, ValidationSettings};
use chrono::format::{Item, StrftimeItems};

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Checks applied to individual settings
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a value is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::invalid(field, "cannot be empty"));
        }
        Ok(())
    }

    /// Validate that a value compiles as a regular expression
    pub fn is_regex(value: &str, field: &str) -> Result<()> {
        regex::Regex::new(value)
            .map(|_| ())
            .map_err(|e| ConfigError::invalid(field, format!("invalid regular expression: {}", e)))
    }

    /// Validate that a value is a usable chrono strftime layout
    pub fn is_date_layout(value: &str, field: &str) -> Result<()> {
        Self::not_empty(value, field)?;

        let mut has_specifier = false;
        for item in StrftimeItems::new(value) {
            match item {
                Item::Error => {
                    return Err(ConfigError::invalid(field, "invalid strftime layout"));
                }
                Item::Numeric(..) | Item::Fixed(..) => has_specifier = true,
                _ => {}
            }
        }

        if !has_specifier {
            return Err(ConfigError::invalid(
                field,
                "layout has no date specifiers (e.g. %m/%d/%Y)",
            ));
        }
        Ok(())
    }
}

impl Validate for ValidationSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_regex(&self.email_format, "email_format")?;
        ConfigValidator::is_regex(&self.phone_format, "phone_format")?;
        ConfigValidator::not_empty(&self.date_format, "date_format")?;
        ConfigValidator::is_date_layout(&self.date_layout, "date_layout")?;

        for name in self.error_messages.keys() {
            ConfigValidator::not_empty(name, "error_messages")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty("value", "field").is_ok());
        assert!(ConfigValidator::not_empty("", "field").is_err());
        assert!(ConfigValidator::not_empty("  ", "field").is_err());
    }

    #[test]
    fn test_regex_validation() {
        assert!(ConfigValidator::is_regex(r"^[0-9]+$", "field").is_ok());
        assert!(ConfigValidator::is_regex(r"^([0-9]+$", "field").is_err());
    }

    #[test]
    fn test_date_layout_validation() {
        assert!(ConfigValidator::is_date_layout("%m/%d/%Y", "field").is_ok());
        assert!(ConfigValidator::is_date_layout("%Y-%m-%dT%H:%M:%S", "field").is_ok());
        assert!(ConfigValidator::is_date_layout("01/02/2006", "field").is_err());
        assert!(ConfigValidator::is_date_layout("%Q", "field").is_err());
        assert!(ConfigValidator::is_date_layout("", "field").is_err());
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(ValidationSettings::default().validate().is_ok());
    }

    #[test]
    fn test_bad_email_format_is_reported() {
        let settings = ValidationSettings {
            email_format: "([a-z".to_string(),
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("email_format"));
    }
}
