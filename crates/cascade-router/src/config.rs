// File: src/config.rs
// Purpose: Router configuration parsing from cascade.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::path::{PathOptions, SEPARATOR};

/// On-disk configuration file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub router: RouterConfig,
}

/// Router configuration
///
/// Paths always use `/` as separator; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Leading token marking a scope-local relative URL (default: ".")
    #[serde(default = "default_relative_indicator")]
    pub relative_indicator: String,

    /// Separator between path and query in relative (`./x`) URLs (default: '?')
    ///
    /// Absolute URLs are split by the URL parser and always use `?`.
    #[serde(default = "default_query_separator")]
    pub query_separator: char,

    /// Base used for URLs without scheme and host
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Re-invoke a handler when only the query string changed (default: false)
    #[serde(default = "default_false")]
    pub reinvoke_on_query_change: bool,
}

// Default values
fn default_relative_indicator() -> String {
    ".".to_string()
}

fn default_query_separator() -> char {
    '?'
}

fn default_base_url() -> String {
    "http://localhost/".to_string()
}

fn default_false() -> bool {
    false
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            relative_indicator: default_relative_indicator(),
            query_separator: default_query_separator(),
            base_url: default_base_url(),
            reinvoke_on_query_change: false,
        }
    }
}

impl RouterConfig {
    /// Load configuration from a TOML file's `[router]` table
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from default path (./cascade.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("cascade.toml")
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let file: ConfigFile = toml::from_str(content).context("Invalid router configuration")?;
        Ok(file.router)
    }

    pub fn path_options(&self) -> PathOptions {
        PathOptions {
            separator: SEPARATOR,
            relative_indicator: self.relative_indicator.clone(),
        }
    }
}
