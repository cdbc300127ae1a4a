//! Bootstrap configuration
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments / environment variables (resolved by clap)
//! 2. TOML configuration file
//! 3. Compiled defaults
//!
//! A missing TOML file is not an error: a warning is logged and defaults
//! apply. A TOML file that exists but cannot be parsed is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CIFRAME_CONFIG";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/dataset_final.csv";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_MAX_CONCURRENT_SIMILARITY: usize = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of the TOML file; every field optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// Corpus file (relative paths resolve against the working directory)
    #[serde(default)]
    pub data_path: Option<PathBuf>,
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
    #[serde(default)]
    pub max_concurrent_similarity: Option<usize>,
    /// Give up waiting for a similarity slot after this long (unset = wait forever)
    #[serde(default)]
    pub gate_acquire_timeout_ms: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: Option<String>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_path: Option<PathBuf>,
    pub cache_ttl_secs: Option<u64>,
    pub max_concurrent_similarity: Option<usize>,
    pub gate_acquire_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub cache_ttl: Duration,
    pub max_concurrent_similarity: usize,
    pub gate_acquire_timeout: Option<Duration>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::resolve(TomlConfig::default(), ConfigOverrides::default())
    }
}

impl Config {
    /// Merge overrides over TOML values over compiled defaults
    pub fn resolve(toml: TomlConfig, overrides: ConfigOverrides) -> Self {
        let max_concurrent = overrides
            .max_concurrent_similarity
            .or(toml.max_concurrent_similarity)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_SIMILARITY);
        if max_concurrent == 0 {
            warn!(
                "max_concurrent_similarity = 0 would block every similarity query, using {}",
                DEFAULT_MAX_CONCURRENT_SIMILARITY
            );
        }

        Self {
            host: overrides
                .host
                .or(toml.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            data_path: overrides
                .data_path
                .or(toml.data_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            cache_ttl: Duration::from_secs(
                overrides
                    .cache_ttl_secs
                    .or(toml.cache_ttl_secs)
                    .unwrap_or(DEFAULT_CACHE_TTL_SECS),
            ),
            max_concurrent_similarity: if max_concurrent == 0 {
                DEFAULT_MAX_CONCURRENT_SIMILARITY
            } else {
                max_concurrent
            },
            gate_acquire_timeout: overrides
                .gate_acquire_timeout_ms
                .or(toml.gate_acquire_timeout_ms)
                .map(Duration::from_millis),
            log_level: overrides
                .log_level
                .or(toml.logging.level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// Locate and read the TOML file, then resolve against `overrides`
    pub fn load(explicit_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let toml = match locate_config_file(explicit_path) {
            Some(path) => read_toml_config(&path)?,
            None => {
                warn!("No config file found, using built-in defaults");
                TomlConfig::default()
            }
        };
        Ok(Self::resolve(toml, overrides))
    }
}

/// Parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    info!("Loaded TOML configuration from {}", path.display());
    Ok(config)
}

/// Config file search order:
/// 1. Explicit path (command line)
/// 2. `CIFRAME_CONFIG` environment variable
/// 3. `~/.config/ciframe/config.toml` (platform config dir)
/// 4. `/etc/ciframe/config.toml`
///
/// Explicit and environment paths are returned even if missing so the read
/// error surfaces; the implicit locations are only used when they exist.
pub fn locate_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join("ciframe").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    let system_config = PathBuf::from("/etc/ciframe/config.toml");
    if cfg!(unix) && system_config.exists() {
        return Some(system_config);
    }

    None
}
