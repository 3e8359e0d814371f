/*!
 * Error types for lineage-sync
 */

use std::fmt;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LineageError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_FATAL: i32 = 2;
pub const EXIT_OUTPUT: i32 = 3;

#[derive(Debug, Error)]
pub enum LineageError {
    /// Credential rejected by the catalog service (login or any later request)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Network, TLS, or unexpected HTTP status failure
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        /// HTTP status when the server answered, `None` when it never did
        status: Option<u16>,
    },

    /// Response body was not the shape we expected
    #[error("Decode error: {0}")]
    Decode(String),

    /// Referenced catalog node no longer resolves
    #[error("Catalog node not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The lineage document could not be written
    #[error("Output error: {0}")]
    Output(String),
}

impl LineageError {
    /// Shorthand for a transport failure that never reached the server
    pub fn transport(message: impl Into<String>) -> Self {
        LineageError::Transport {
            message: message.into(),
            status: None,
        }
    }

    /// Map a non-success HTTP status: 401/403 reject the credential,
    /// anything else is a transport failure carrying the status
    pub fn from_status(what: &str, status: u16) -> Self {
        match status {
            401 | 403 => LineageError::Auth(format!("{} rejected with HTTP {}", what, status)),
            _ => LineageError::Transport {
                message: format!("{} returned HTTP {}", what, status),
                status: Some(status),
            },
        }
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            LineageError::Output(_) => EXIT_OUTPUT,
            // Anything else aborted the run before a document existed
            _ => EXIT_FATAL,
        }
    }

    /// Check if this error is transient (temporary, worth retrying)
    pub fn is_transient(&self) -> bool {
        match self {
            LineageError::Transport { status: None, .. } => true,
            LineageError::Transport {
                status: Some(code), ..
            } => *code == 429 || (500..600).contains(code),
            // Not transient: retrying would get the same answer
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            LineageError::Auth(_) => ErrorCategory::Security,
            LineageError::Transport { .. } => ErrorCategory::Network,
            LineageError::Decode(_) => ErrorCategory::Decode,
            LineageError::NotFound(_) => ErrorCategory::Lookup,
            LineageError::Config(_) => ErrorCategory::Configuration,
            LineageError::Io(_) => ErrorCategory::IoError,
            LineageError::Output(_) => ErrorCategory::Output,
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Authentication/authorization errors
    Security,
    /// Network/transport errors
    Network,
    /// Malformed responses
    Decode,
    /// Missing catalog nodes
    Lookup,
    /// Configuration errors
    Configuration,
    /// Local I/O errors
    IoError,
    /// Document serialization or write errors
    Output,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Security => write!(f, "security"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Decode => write!(f, "decode"),
            ErrorCategory::Lookup => write!(f, "lookup"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::IoError => write!(f, "io"),
            ErrorCategory::Output => write!(f, "output"),
        }
    }
}

impl From<reqwest::Error> for LineageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return LineageError::Decode(err.to_string());
        }
        LineageError::Transport {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

impl From<serde_json::Error> for LineageError {
    fn from(err: serde_json::Error) -> Self {
        LineageError::Decode(format!("JSON parse error: {}", err))
    }
}

impl From<toml::de::Error> for LineageError {
    fn from(err: toml::de::Error) -> Self {
        LineageError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for LineageError {
    fn from(err: toml::ser::Error) -> Self {
        LineageError::Config(format!("TOML serialize error: {}", err))
    }
}
