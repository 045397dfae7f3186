//! Error taxonomy for a collection and analysis run
//!
//! Only `ConnectionError` and `ConfigError` ever abort a run. Command failures
//! are folded into the collected data and analysis failures into the
//! narrative result.

use std::path::PathBuf;

/// The device session could not be established
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("device {host} is unreachable: {detail}")]
    Unreachable { host: String, detail: String },

    #[error("connection to {host} timed out after {secs} seconds")]
    Timeout { host: String, secs: u64 },
}

/// A single diagnostic command failed on an otherwise healthy session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandExecutionError {
    #[error("command timed out after {0} seconds")]
    Timeout(u64),

    #[error("session transport failed: {0}")]
    Transport(String),

    #[error("command exited with status {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    /// Failure text reported by the device or session as-is
    #[error("{0}")]
    Device(String),
}

/// The completion service could not produce a narrative
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Error analyzing data: {0}")]
    Transport(String),

    #[error("Error analyzing data: request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Error getting analysis: {0}")]
    Service(u16),

    #[error("Error analyzing data: malformed response body: {0}")]
    MalformedResponse(String),
}

impl AnalysisError {
    /// Status code for service-side failures
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Service(code) => Some(*code),
            _ => None,
        }
    }
}

/// Configuration file could not be read or is invalid
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
