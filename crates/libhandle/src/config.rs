//! Loader configuration.
//!
//! Defaults suit in-process plugin loading: host naming, lazy binding, no
//! search directory and failure reporting enabled.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};
use crate::naming::NamingConvention;

/// Environment variable names read by [`LoaderConfig::from_env`].
pub mod env_vars {
    pub const SEARCH_DIR: &str = "LIBHANDLE_SEARCH_DIR";
    pub const BIND: &str = "LIBHANDLE_BIND";
    pub const REPORT_FAILURES: &str = "LIBHANDLE_REPORT_FAILURES";
}

/// When the platform loader resolves undefined references.
///
/// Only meaningful for `dlopen`; the Windows loader always binds eagerly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Resolve references on first use (`RTLD_LAZY`).
    #[default]
    Lazy,
    /// Resolve all references while opening (`RTLD_NOW`).
    Now,
}

impl FromStr for BindMode {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lazy" => Ok(BindMode::Lazy),
            "now" => Ok(BindMode::Now),
            other => Err(LibraryError::Config(format!(
                "unknown bind mode {:?}, expected \"lazy\" or \"now\"",
                other
            ))),
        }
    }
}

/// Configuration for a [`LibraryHandle`](crate::LibraryHandle).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// File-name convention used to derive the library file name.
    pub naming: NamingConvention,

    /// Binding mode passed to the platform loader.
    pub bind: BindMode,

    /// Directory prepended to the derived file name. When unset the
    /// platform search path is used.
    pub search_dir: Option<PathBuf>,

    /// Emit `warn` events when an operation fails. Errors are returned
    /// either way.
    pub report_failures: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            naming: NamingConvention::host(),
            bind: BindMode::Lazy,
            search_dir: None,
            report_failures: true,
        }
    }
}

impl LoaderConfig {
    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_bind(mut self, bind: BindMode) -> Self {
        self.bind = bind;
        self
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    pub fn with_report_failures(mut self, report: bool) -> Self {
        self.report_failures = report;
        self
    }

    /// Parse a TOML document. Missing keys take their default value.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| LibraryError::Config(e.to_string()))
    }

    /// Defaults overridden by the `LIBHANDLE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by the values `lookup` returns for the
    /// [`env_vars`] keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(env_vars::SEARCH_DIR).filter(|d| !d.is_empty()) {
            config.search_dir = Some(PathBuf::from(dir));
        }

        if let Some(bind) = lookup(env_vars::BIND) {
            config.bind = bind.parse()?;
        }

        if let Some(report) = lookup(env_vars::REPORT_FAILURES) {
            config.report_failures = parse_bool(&report).ok_or_else(|| {
                LibraryError::Config(format!(
                    "{} must be a boolean, got {:?}",
                    env_vars::REPORT_FAILURES,
                    report
                ))
            })?;
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
