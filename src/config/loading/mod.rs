use std::{fs, path::Path};

use tracing::{debug, instrument};
use zbus::zvariant::ObjectPath;
use zbus::names::WellKnownName;

use super::{Config, ConfigPaths, MAX_PANEL_INDEX};
use crate::{NowPlayingError, Result};

impl Config {
    /// Load the configuration from its default location
    ///
    /// # Errors
    /// Returns an error if the location cannot be determined or
    /// [`Config::load_from`] fails.
    pub fn load() -> Result<Config> {
        let path = ConfigPaths::main_config()?;
        Self::load_from(&path)
    }

    /// Load and validate the configuration at `path`
    ///
    /// A missing file is not an error and yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The TOML content is invalid
    /// - A value fails validation
    #[instrument]
    pub fn load_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            debug!("No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| NowPlayingError::IoError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| NowPlayingError::toml_parse(e, Some(path)))?;
        config.validate()?;

        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    /// Returns an error if the TOML is invalid or a value fails validation.
    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| NowPlayingError::toml_parse(e, None))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check by type alone
    ///
    /// # Errors
    /// Returns `NowPlayingError::ConfigValidation` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        WellKnownName::try_from(self.player.service_name.as_str()).map_err(|e| {
            NowPlayingError::ConfigValidation {
                component: "player.service_name".to_string(),
                details: e.to_string(),
            }
        })?;

        ObjectPath::try_from(self.player.object_path.as_str()).map_err(|e| {
            NowPlayingError::ConfigValidation {
                component: "player.object_path".to_string(),
                details: e.to_string(),
            }
        })?;

        if self.player.call_timeout_ms == 0 {
            return Err(NowPlayingError::ConfigValidation {
                component: "player.call_timeout_ms".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        if self.panel.index > MAX_PANEL_INDEX {
            return Err(NowPlayingError::ConfigValidation {
                component: "panel.index".to_string(),
                details: format!("must be at most {MAX_PANEL_INDEX}"),
            });
        }

        Ok(())
    }

    /// JSON schema of the configuration file, pretty printed
    ///
    /// # Errors
    /// Returns `NowPlayingError::Schema` if serialization fails.
    pub fn schema_json() -> Result<String> {
        let schema = schemars::schema_for!(Config);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}
