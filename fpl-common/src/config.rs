//! Configuration loading and layered resolution
//!
//! Resolution priority, highest first:
//! 1. Command-line arguments
//! 2. Environment variables (bound to the same arguments by the binary)
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! Layers 1 and 2 arrive here as a single [`ConfigOverrides`]; this module
//! owns layers 3 and 4.

use crate::models::TeamId;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;
pub const DEFAULT_STATIC_DIR: &str = "./static";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Service configuration, as read from TOML and after overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Interface to bind the HTTP server to
    pub bind: String,

    /// HTTP server port
    pub port: u16,

    /// League used by `/standings` when the request names none, and for
    /// team discovery when `team_ids` is empty
    pub league_id: Option<u64>,

    /// Fixed set of tracked teams for `/history` and `/latest_gameweek`
    pub team_ids: Vec<TeamId>,

    /// Directory served for all unmatched routes
    pub static_dir: PathBuf,

    pub upstream: UpstreamConfig,

    pub logging: LoggingConfig,
}

/// Upstream FPL API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// API root, without a trailing slash
    pub base_url: String,

    /// Per-fetch deadline in seconds
    pub timeout_secs: u64,

    /// Upper bound on in-flight upstream requests per aggregate
    pub max_concurrent_fetches: usize,

    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            league_id: None,
            team_ids: Vec::new(),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            user_agent: concat!("fpl-tracker/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file found; `searched` is the default location that was checked
    Defaults { searched: Option<PathBuf> },
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults { searched: Some(path) } => {
                write!(f, "built-in defaults (no file at {})", path.display())
            }
            ConfigSource::Defaults { searched: None } => write!(f, "built-in defaults"),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub league_id: Option<u64>,
    pub team_ids: Option<Vec<TeamId>>,
    pub static_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl ServiceConfig {
    /// Parse a TOML document; absent keys take compiled defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    ///
    /// An explicitly requested file must exist. Without one, the platform
    /// default location is tried; if nothing is there the compiled
    /// defaults are used. The returned [`ConfigSource`] says which happened
    /// so the caller can log it once tracing is up.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            let config = Self::load_file(path)?;
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                let config = Self::load_file(&path)?;
                Ok((config, ConfigSource::File(path)))
            }
            searched => Ok((Self::default(), ConfigSource::Defaults { searched })),
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Apply command-line / environment values on top of this config
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind) = overrides.bind {
            self.bind = bind;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(league_id) = overrides.league_id {
            self.league_id = Some(league_id);
        }
        if let Some(team_ids) = overrides.team_ids {
            self.team_ids = team_ids;
        }
        if let Some(static_dir) = overrides.static_dir {
            self.static_dir = static_dir;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config("port must be non-zero".to_string()));
        }
        if self.league_id == Some(0) {
            return Err(Error::Config("league_id must be positive".to_string()));
        }
        if self.team_ids.contains(&0) {
            return Err(Error::Config("team_ids must be positive".to_string()));
        }
        if self.upstream.base_url.trim().is_empty() {
            return Err(Error::Config("upstream.base_url is empty".to_string()));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(Error::Config(
                "upstream.timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.upstream.max_concurrent_fetches == 0 {
            return Err(Error::Config(
                "upstream.max_concurrent_fetches must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` string for the listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// `<config_dir>/fpl-tracker/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fpl-tracker").join("config.toml"))
}
