use std::path::Path;

use thiserror::Error;

use crate::services::now_playing::MediaError;

/// Error types for the nowplaying application.
///
/// Covers configuration loading and everything the media service reports.
#[derive(Error, Debug)]
pub enum NowPlayingError {
    /// Configuration validation error
    #[error("configuration validation failed for '{component}': {details}")]
    ConfigValidation {
        /// Component that failed validation
        component: String,
        /// Validation error details
        details: String,
    },

    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: std::path::PathBuf,
        /// I/O error details
        details: String,
    },

    /// Standard I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },

    /// Schema could not be serialized
    #[error("failed to render schema: {0}")]
    Schema(#[from] serde_json::Error),

    /// Media player service error
    #[error(transparent)]
    Media(#[from] MediaError),
}

/// A specialized `Result` type for nowplaying operations.
pub type Result<T> = std::result::Result<T, NowPlayingError>;

impl NowPlayingError {
    /// Creates a TOML parsing error with optional file path context.
    ///
    /// # Arguments
    ///
    /// * `error` - The underlying parsing error
    /// * `path` - Optional path to the file that failed to parse
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        NowPlayingError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }
}
