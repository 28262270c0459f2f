//! Service configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file read when none is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Format of the service configuration file.
///
/// ```toml
/// [listen]
/// host = "localhost"
/// port = 8080
///
/// [gnucash]
/// file = "books.gnucash"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the HTTP server listens.
    pub listen: ListenConfig,
    /// The book to serve.
    pub gnucash: GnucashConfig,
}

/// Listening address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenConfig {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
        }
    }
}

impl ListenConfig {
    /// `host:port`, as accepted by `TcpListener::bind`.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Location of the GnuCash book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GnucashConfig {
    /// Path of the book, compressed or not.
    pub file: Option<PathBuf>,
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Read a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("in configuration file {}", path.display()))
    }

    /// Read the configuration from `path`, or from [`DEFAULT_CONFIG_FILE`]
    /// when no path is given.
    ///
    /// An explicit path must exist; a missing default file yields the
    /// default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            tracing::info!("configuration file is '{}'", path.display());
            return Self::from_file(path);
        }

        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.exists() {
            tracing::info!("configuration file is '{}'", default.display());
            Self::from_file(default)
        } else {
            tracing::info!("no configuration file, using defaults");
            Ok(Self::default())
        }
    }
}
