//! Configuration loading and model directory resolution
//!
//! Bootstrap settings come from an optional TOML file. Missing files are not
//! an error: defaults apply and startup continues.
//!
//! # Priority order
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::artifact::{ResolverConfig, DEFAULT_CANDIDATES};
use crate::{Error, Result};

/// Environment variable overriding the model directory
pub const MODEL_DIR_ENV: &str = "SKYFARE_MODEL_DIR";

/// Environment variable overriding the bind address
pub const BIND_ENV: &str = "SKYFARE_BIND";

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:5730";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Directory holding the model artifact
    #[serde(default)]
    pub model_dir: Option<PathBuf>,

    /// Artifact file names, highest priority first
    #[serde(default)]
    pub candidates: Option<Vec<String>>,

    /// HTTP bind address
    #[serde(default)]
    pub bind_addr: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default configuration file path for the platform, if one exists
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("skyfare").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/skyfare/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load the TOML config, degrading to defaults when absent
///
/// An explicitly requested file that cannot be loaded is an error; a missing
/// default file is not.
pub fn load_or_default(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        let config = load_toml_config(path)?;
        info!("Loaded config from {}", path.display());
        return Ok(config);
    }

    match default_config_path() {
        Some(path) => match load_toml_config(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Ok(TomlConfig::default())
            }
        },
        None => {
            info!("No config file found, using defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Resolve the model directory: CLI → env → TOML → current directory
pub fn resolve_model_dir(cli_arg: Option<&Path>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(MODEL_DIR_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml.model_dir {
        return path.clone();
    }

    PathBuf::from(".")
}

/// Resolve the bind address: CLI → env → TOML → [`DEFAULT_BIND`]
pub fn resolve_bind_addr(cli_arg: Option<&str>, toml: &TomlConfig) -> Result<SocketAddr> {
    let env_value = std::env::var(BIND_ENV).ok().filter(|s| !s.trim().is_empty());

    let raw = cli_arg
        .map(str::to_string)
        .or(env_value)
        .or_else(|| toml.bind_addr.clone())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", raw, e)))
}

/// Build the resolver configuration from CLI and TOML inputs
pub fn resolver_config(cli_model_dir: Option<&Path>, toml: &TomlConfig) -> Result<ResolverConfig> {
    let candidates = match &toml.candidates {
        Some(list) if list.is_empty() => {
            return Err(Error::Config("candidates list must not be empty".to_string()))
        }
        Some(list) => list.clone(),
        None => DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
    };

    Ok(ResolverConfig {
        model_dir: resolve_model_dir(cli_model_dir, toml),
        candidates,
    })
}
