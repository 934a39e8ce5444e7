//! Error types for dockgrade.
//!
//! Check failures are never errors: they are recorded as
//! [`CheckOutcome::Failed`](crate::outcome::CheckOutcome::Failed). The types
//! here cover the few things that can escape a component.

use thiserror::Error;

/// Fatal errors that abort a scoring run.
#[derive(Error, Debug)]
pub enum ScorerError {
    /// The build tool could not be started at all.
    #[error("container engine '{binary}' is not installed or not running: {reason}")]
    EngineUnavailable { binary: String, reason: String },

    /// IO error while writing a report artifact.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from running a single external command.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The command vector was empty.
    #[error("command '{0}' has an empty argument vector")]
    EmptyCommand(String),

    /// The process could not be spawned.
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process did not finish within its timeout and was killed.
    #[error("command '{command}' timed out after {timeout_secs} seconds")]
    Timeout { command: String, timeout_secs: u64 },

    /// Waiting for the process failed.
    #[error("failed to wait for '{command}': {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Size string returned by the image store could not be interpreted.
#[derive(Error, Debug, PartialEq)]
pub enum SizeFormatError {
    /// Unit suffix other than `MB` or `GB`.
    #[error("Unknown size format: {0}")]
    UnknownUnit(String),

    /// Numeric part failed to parse.
    #[error("Invalid size value: {0}")]
    InvalidNumber(String),
}

/// Errors from the HTTP health probe.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Connection, timeout or status error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body was not valid JSON.
    #[error("malformed health response: {0}")]
    MalformedBody(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        ProbeError::Http(err.to_string())
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, ScorerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_unavailable_names_binary() {
        let err = ScorerError::EngineUnavailable {
            binary: "docker".to_string(),
            reason: "No such file or directory".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("docker"));
        assert!(msg.contains("not installed"));
    }

    #[test]
    fn test_timeout_displays_seconds() {
        let err = RunnerError::Timeout {
            command: "docker build".to_string(),
            timeout_secs: 300,
        };
        assert!(err.to_string().contains("300"));
    }

    #[test]
    fn test_unknown_unit_matches_report_wording() {
        let err = SizeFormatError::UnknownUnit("500KB".to_string());
        assert_eq!(err.to_string(), "Unknown size format: 500KB");
    }
}
