//! Optional JSON configuration file.
//!
//! Holds defaults for the command-line switches plus a log filter. Flags
//! given on the command line can only turn options on; the file cannot be
//! used to force an option off for a single run.

use crate::error::{Error, Result};
use crate::session::SessionOptions;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "ACDCONTROL_CONFIG";

/// User configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Suppress the driver version and startup lines.
    pub silent: bool,
    /// Print only brightness values.
    pub brief: bool,
    /// Operate on devices missing from the registry.
    pub force: bool,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Config {
    /// Session options with command-line flags OR-ed onto the file defaults.
    pub fn session_options(&self, silent: bool, brief: bool, force: bool) -> SessionOptions {
        SessionOptions {
            silent: self.silent || silent,
            brief: self.brief || brief,
            force: self.force || force,
        }
    }
}

/// Where a config file path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or through [`CONFIG_ENV`]; must exist.
    Explicit(PathBuf),
    /// Default location under the user's config directory; may be absent.
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(path) | Self::Default(path) => path,
        }
    }
}

/// Resolve the config path from the explicit flag and environment values.
///
/// Precedence: flag, `ACDCONTROL_CONFIG`, `$XDG_CONFIG_HOME/acdcontrol`,
/// `$HOME/.config/acdcontrol`. Empty variables count as unset.
pub fn resolve_path(
    explicit: Option<&Path>,
    env_config: Option<OsString>,
    xdg_config_home: Option<OsString>,
    home: Option<OsString>,
) -> Option<ConfigSource> {
    let non_empty = |value: Option<OsString>| value.filter(|v| !v.is_empty());

    if let Some(path) = explicit {
        return Some(ConfigSource::Explicit(path.to_path_buf()));
    }
    if let Some(path) = non_empty(env_config) {
        return Some(ConfigSource::Explicit(PathBuf::from(path)));
    }
    if let Some(dir) = non_empty(xdg_config_home) {
        return Some(ConfigSource::Default(
            PathBuf::from(dir).join("acdcontrol").join("config.json"),
        ));
    }
    non_empty(home).map(|home| {
        ConfigSource::Default(
            PathBuf::from(home)
                .join(".config")
                .join("acdcontrol")
                .join("config.json"),
        )
    })
}

/// Config path for this process.
pub fn config_path(explicit: Option<&Path>) -> Option<ConfigSource> {
    resolve_path(
        explicit,
        std::env::var_os(CONFIG_ENV),
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

/// Read and parse a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&data).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

/// Load the config for this process.
///
/// A missing default file yields the defaults; a missing explicit file is an
/// error.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    load_from(config_path(explicit))
}

fn load_from(source: Option<ConfigSource>) -> Result<Config> {
    match source {
        None => Ok(Config::default()),
        Some(ConfigSource::Default(path)) if !path.exists() => {
            debug!(path = %path.display(), "No config file");
            Ok(Config::default())
        }
        Some(source) => {
            let config = load_config(source.path())?;
            debug!(path = %source.path().display(), ?config, "Loaded config");
            Ok(config)
        }
    }
}
