//! Server configuration
//!
//! Resolved in layers: defaults, then an optional TOML file, then the
//! `SRB_BIND` / `SRB_SNAPSHOT` environment variables, then CLI flags.

use serde::{Deserialize, Serialize};
use srb_model::RiskPolicy;
use std::path::{Path, PathBuf};

/// Environment variable overriding [`ServerConfig::bind`]
pub const ENV_BIND: &str = "SRB_BIND";
/// Environment variable overriding [`ServerConfig::snapshot_path`]
pub const ENV_SNAPSHOT: &str = "SRB_SNAPSHOT";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values are inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid(format!("unknown log format: {other}"))),
        }
    }
}

/// SRB server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,
    /// JSON snapshot file; records live only in memory when unset
    pub snapshot_path: Option<PathBuf>,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
    pub log_format: LogFormat,
    /// Listing window when the request has no `limit`
    pub page_size: usize,
    /// Largest accepted `limit`
    pub max_page_size: usize,
    /// Escalation and completion thresholds
    pub policy: RiskPolicy,
}

impl ServerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed input.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply environment overrides read through `lookup`
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.is_empty()) {
            self.bind = bind;
        }
        if let Some(path) = lookup(ENV_SNAPSHOT).filter(|v| !v.is_empty()) {
            self.snapshot_path = Some(PathBuf::from(path));
        }
        self
    }

    /// With listen address
    #[inline]
    #[must_use]
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// With snapshot file
    #[inline]
    #[must_use]
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// With log format
    #[inline]
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// With listing window sizes
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize, max_page_size: usize) -> Self {
        self.page_size = page_size;
        self.max_page_size = max_page_size;
        self
    }

    /// With risk policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: RiskPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Check value consistency
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the offending values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 || self.page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "page_size must be between 1 and max_page_size ({} > {})",
                self.page_size, self.max_page_size
            )));
        }
        if self.policy.low_risk_ceiling >= self.policy.escalation_threshold {
            return Err(ConfigError::Invalid(format!(
                "low_risk_ceiling ({}) must be below escalation_threshold ({})",
                self.policy.low_risk_ceiling, self.policy.escalation_threshold
            )));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            snapshot_path: None,
            log_filter: "info,srb_store=debug,srb_workflow=debug".to_string(),
            log_format: LogFormat::Pretty,
            page_size: 50,
            max_page_size: 500,
            policy: RiskPolicy::default(),
        }
    }
}
