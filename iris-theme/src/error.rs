//! Error types for theme configuration and watching.

use std::path::PathBuf;

/// Convenience alias for results produced by this crate.
pub type ThemingResult<T> = Result<T, ThemingError>;

/// Errors that can occur while loading or watching theme configuration.
#[derive(Debug, thiserror::Error)]
pub enum ThemingError {
    /// The configured theme config file does not exist.
    #[error("theme config not found: {path:?}")]
    ConfigNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The theme config file exists but could not be parsed.
    #[error("failed to parse theme config {path:?}: {details}")]
    ConfigParse {
        /// Path of the offending file.
        path: PathBuf,
        /// Parser diagnostics.
        details: String,
    },

    /// Inline TOML content could not be parsed.
    #[error("invalid theme config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The config file watcher could not be set up.
    #[cfg(feature = "watch")]
    #[error("failed to watch theme config: {source}")]
    Watch {
        /// Underlying watcher error.
        #[source]
        source: notify::Error,
    },

    /// An I/O error occurred while reading the config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ThemingError {
    /// Creates a [ThemingError::ConfigNotFound] error.
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Creates a [ThemingError::ConfigParse] error.
    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Creates a [ThemingError::Watch] error.
    #[cfg(feature = "watch")]
    pub fn watch_error(source: notify::Error) -> Self {
        Self::Watch { source }
    }
}
