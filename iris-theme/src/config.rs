//! Theme configuration from the environment and from TOML files.
//!
//! A [ThemingConfig] describes which theme content the process starts
//! with: the theme name and version applied to the default theme.
//! Configuration is looked up in this order, later sources overriding
//! earlier ones:
//!
//! 1. built-in defaults,
//! 2. the TOML file named by [THEME_CONFIG_ENV],
//! 3. the [THEME_ENV] and [THEME_VERSION_ENV] variables.
//!
//! Applying a config never replaces the default theme instance; it
//! renames and re-versions it in place, so every node already resolved
//! to the default theme reloads instead of switching identity.
//!
//! # Example
//!
//! ```toml
//! [theme]
//! name = "night"
//! version = 2
//! ```

use std::path::Path;
use std::rc::Rc;
use std::{env, fs};

use serde::{Deserialize, Serialize};

use crate::error::{ThemingError, ThemingResult};
use crate::theme::{Theme, DEFAULT_THEME_NAME};

/// Environment variable selecting the theme name.
pub const THEME_ENV: &str = "IRIS_THEME";

/// Environment variable selecting the theme version.
pub const THEME_VERSION_ENV: &str = "IRIS_THEME_VERSION";

/// Environment variable naming a theme config file to load.
pub const THEME_CONFIG_ENV: &str = "IRIS_THEME_CONFIG";

/// Theming configuration of the process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThemingConfig {
    /// The `[theme]` section.
    #[serde(default)]
    pub theme: ThemeSection,
}

/// The `[theme]` section of a theme config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSection {
    /// Name applied to the default theme.
    #[serde(default = "default_theme_name")]
    pub name: String,
    /// Version applied to the default theme.
    #[serde(default = "default_theme_version")]
    pub version: u32,
}

impl Default for ThemeSection {
    fn default() -> Self {
        Self {
            name: default_theme_name(),
            version: default_theme_version(),
        }
    }
}

fn default_theme_name() -> String {
    DEFAULT_THEME_NAME.to_string()
}

fn default_theme_version() -> u32 {
    1
}

impl ThemingConfig {
    /// Creates a config with built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the theme name.
    pub fn with_theme_name(mut self, name: impl Into<String>) -> Self {
        self.theme.name = name.into();
        self
    }

    /// Sets the theme version.
    pub fn with_theme_version(mut self, version: u32) -> Self {
        self.theme.version = version;
        self
    }

    /// Loads configuration from the environment, falling back to
    /// defaults.
    ///
    /// A file named by [THEME_CONFIG_ENV] is read first; a missing or
    /// unparseable file is logged and skipped. The [THEME_ENV] and
    /// [THEME_VERSION_ENV] variables override whatever the file said.
    pub fn from_env_or_default() -> Self {
        let mut config = Self::new();
        if let Ok(path) = env::var(THEME_CONFIG_ENV) {
            match Self::from_file(&path) {
                Ok(file_config) => config = file_config,
                Err(error) => {
                    log::warn!("ignoring theme config file {path:?}: {error}");
                }
            }
        }
        if let Ok(name) = env::var(THEME_ENV) {
            config.theme.name = name;
        }
        if let Ok(version) = env::var(THEME_VERSION_ENV) {
            match version.parse() {
                Ok(version) => config.theme.version = version,
                Err(_) => {
                    log::warn!("ignoring non-numeric {THEME_VERSION_ENV}={version:?}");
                }
            }
        }
        config
    }

    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ThemingResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ThemingError::config_not_found(path));
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|error| ThemingError::parse_error(path, error.to_string()))
    }

    /// Parses configuration from TOML content.
    pub fn from_toml(content: &str) -> ThemingResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies this config to the current thread's default theme and
    /// returns it.
    pub fn apply(&self) -> Rc<Theme> {
        let theme = Theme::default_theme();
        self.apply_to(&theme);
        theme
    }

    /// Applies this config to `theme`, renaming and re-versioning it
    /// in place.
    pub fn apply_to(&self, theme: &Rc<Theme>) {
        theme.set_name(self.theme.name.clone());
        theme.set_version(self.theme.version);
    }
}
