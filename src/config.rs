/*!
 * Configuration types for lineage-sync
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LineageError, Result};

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "lineage-sync.toml";

/// Main configuration for a lineage run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Catalog service base URL, e.g. `https://dremio.example.com:9047`
    #[serde(default)]
    pub url: String,

    /// Login user (self-hosted only)
    #[serde(default)]
    pub username: String,

    /// Login password, or the personal access token in cloud mode
    #[serde(default)]
    pub password: String,

    /// Self-hosted or managed cloud deployment
    #[serde(default)]
    pub deployment: DeploymentMode,

    /// Project identifier, required in cloud mode
    #[serde(default)]
    pub project_id: String,

    /// Extra path inserted before `/projects` in cloud mode (e.g. "/v0")
    #[serde(default)]
    pub api_prefix: String,

    /// Prefix prepended to the login token in the Authorization header
    #[serde(default = "default_token_prefix")]
    pub token_prefix: String,

    /// Skip TLS certificate validation
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Where the lineage document is written
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Indent the lineage document
    #[serde(default)]
    pub pretty: bool,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,

    /// What to do when a single node fails to fetch
    #[serde(default)]
    pub error_mode: ErrorMode,

    /// Treat Phase 1 dataset ids as already seen during upstream closure
    #[serde(default)]
    pub reconcile_primary_ids: bool,

    /// Show a progress spinner while traversing
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// Retry behaviour for catalog requests
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            deployment: DeploymentMode::SelfHosted,
            project_id: String::new(),
            api_prefix: String::new(),
            token_prefix: default_token_prefix(),
            accept_invalid_certs: false,
            request_timeout_secs: default_request_timeout(),
            output: default_output(),
            pretty: false,
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
            error_mode: ErrorMode::Abort,
            reconcile_primary_ids: false,
            show_progress: true,
            retry: RetrySettings::default(),
        }
    }
}

/// Where the catalog service runs; only changes URL construction and auth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentMode {
    /// Customer-operated service, login with user/password
    #[default]
    SelfHosted,

    /// Managed service, paths scoped by project and a personal access token
    Cloud,
}

/// Error handling mode for per-node fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Abort on first error, nothing is written
    #[default]
    Abort,

    /// Record the failed node, keep traversing
    Skip,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including response bodies
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Backoff strategy for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed,

    /// Linear increase in delay
    Linear,

    /// Exponential increase in delay (2^n)
    Exponential,

    /// Exponential with random jitter
    #[default]
    ExponentialWithJitter,
}

/// Serializable retry settings, turned into a `RetryPolicy` at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt (0 = never retry)
    #[serde(default = "default_retry_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default)]
    pub backoff: BackoffStrategy,

    /// Jitter factor (0.0-1.0)
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff: BackoffStrategy::ExponentialWithJitter,
            jitter_factor: default_jitter_factor(),
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_token_prefix() -> String {
    "_dremio".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_output() -> PathBuf {
    PathBuf::from("lineage.json")
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    200
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_jitter_factor() -> f64 {
    0.3
}

impl RunConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LineageError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: RunConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject configurations that cannot possibly reach the catalog
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(LineageError::Config("Catalog URL is required".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(LineageError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_factor) {
            return Err(LineageError::Config(
                "retry.jitter_factor must be between 0.0 and 1.0".to_string(),
            ));
        }
        match self.deployment {
            DeploymentMode::Cloud if self.project_id.trim().is_empty() => Err(
                LineageError::Config("project_id is required in cloud mode".to_string()),
            ),
            DeploymentMode::SelfHosted if self.username.trim().is_empty() => Err(
                LineageError::Config("username is required in self-hosted mode".to_string()),
            ),
            _ => Ok(()),
        }
    }
}
