// Settings management for tagrule validation contexts

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::*;
pub use validation::{ConfigValidator, Validate};

use std::path::PathBuf;

/// Builder that layers settings sources.
///
/// Later sources win: defaults, then files in the order added, then the
/// environment. The result is validated before it is returned.
///
/// ```no_run
/// use tagrule_config::SettingsBuilder;
///
/// let settings = SettingsBuilder::new()
///     .add_file("validation.toml")
///     .load_dotenv(None)
///     .load_env()
///     .build()?;
/// # Ok::<(), tagrule_config::ConfigError>(())
/// ```
pub struct SettingsBuilder {
    base: ValidationSettings,
    prefix: String,
    load_env: bool,
    load_dotenv: bool,
    dotenv_path: Option<PathBuf>,
    config_files: Vec<PathBuf>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            base: ValidationSettings::default(),
            prefix: env::DEFAULT_PREFIX.to_string(),
            load_env: false,
            load_dotenv: false,
            dotenv_path: None,
            config_files: Vec::new(),
        }
    }

    /// Start from explicit settings instead of the defaults
    pub fn with_base(mut self, base: ValidationSettings) -> Self {
        self.base = base;
        self
    }

    /// Set environment variable prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Enable loading from environment variables
    pub fn load_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Enable loading from a .env file (current directory when `None`)
    pub fn load_dotenv(mut self, path: Option<PathBuf>) -> Self {
        self.load_dotenv = true;
        self.dotenv_path = path;
        self
    }

    /// Add a settings file; format is picked from its extension
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push(path.into());
        self
    }

    /// Build and validate the settings
    pub fn build(self) -> Result<ValidationSettings> {
        let mut settings = self.base;

        for path in &self.config_files {
            ConfigLoader::auto(path)?
                .load_overlay(path)?
                .apply_to(&mut settings);
        }

        if self.load_dotenv {
            match &self.dotenv_path {
                Some(path) => {
                    dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
                }
                None => ignore_missing(dotenvy::dotenv())?,
            }
        }

        if self.load_env {
            EnvLoader::new(Some(self.prefix)).apply(&mut settings)?;
        }

        settings.validate()?;
        Ok(settings)
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A missing `.env` in the working directory is fine; anything else is not
fn ignore_missing<T>(result: std::result::Result<T, dotenvy::Error>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::trace!("no .env file in the working directory");
            Ok(())
        }
        Err(e) => Err(ConfigError::LoadError(format!(".env: {}", e))),
    }
}
