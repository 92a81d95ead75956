//! Structured error types for the test-spec engine.
//!
//! Only fatal conditions live here. Divergences between a spec and a
//! transcript are not errors in this sense; they are collected as
//! [`ErrorRecord`](crate::report::ErrorRecord)s and rendered into the
//! failure report.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = TestSpecError> = std::result::Result<T, E>;

/// Fatal error raised while compiling, running, or diagnosing a test spec.
#[derive(Debug, Error)]
pub enum TestSpecError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON from {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    /// The runner returned no entry for an id it was handed.
    #[error("expected message with ID {id} to have an entry in the transcript under key {key:?}, but it was not found")]
    MissingTranscriptEntry { id: i64, key: String },

    #[error("transcript request ID {id} does not belong to a client request in this spec")]
    NotARequest { id: i64 },

    /// The compiled spec handed to the verifier came from a different spec.
    #[error("correlation map has {ids} ids but the spec declares {messages} messages")]
    CorrelationMismatch { messages: usize, ids: usize },

    #[error("no captured frame lies outside the test-spec builder")]
    NoCallerFrame,

    #[error("failed to parse source file {path}")]
    ParseFailed { path: PathBuf },

    /// No call expression encloses the captured line. This is a bug in the
    /// diagnostics path, never a test failure.
    #[error("no call expression in {path} encloses line {line}")]
    CallSiteNotFound { path: PathBuf, line: u32 },

    #[error("unknown variable `${{{name}}}` in payload")]
    UnknownVariable { name: String },

    #[error("wait directive was never satisfied: {directive}")]
    WaitNotSatisfied { directive: String },
}

impl TestSpecError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    pub fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Log the error at warn level.
    pub fn log_warn(&self) {
        tracing::warn!("test spec error: {}", self);
    }
}
