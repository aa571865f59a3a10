//! Result and error types for Storeprobe.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for Storeprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// How a failed scenario failed, for reporting.
///
/// Scenarios only ever fail with a timeout or an assertion mismatch; anything
/// else means the harness or the automation boundary broke underneath them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// An element did not appear or disappear in time
    Timeout,
    /// Displayed text or cardinality differed from the expectation
    Assertion,
    /// Driver, configuration or filesystem trouble
    Infrastructure,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::Assertion => "assertion",
            Self::Infrastructure => "infrastructure",
        };
        f.write_str(label)
    }
}

/// Errors that can occur in Storeprobe
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Wait for an element (or its absence) timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// What was being waited for
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Displayed value did not match the expected literal
    #[error("Assertion failed ({context}): expected '{expected}' but got '{actual}'")]
    AssertionMismatch {
        /// Which check failed
        context: String,
        /// Expected value
        expected: String,
        /// Actual value
        actual: String,
    },

    /// The automation boundary rejected an action
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// An action target matched no element
    #[error("No element matches {query}")]
    ElementNotFound {
        /// Rendered query
        query: String,
    },

    /// App could not be launched
    #[error("Failed to launch app: {message}")]
    LaunchFailed {
        /// Error message
        message: String,
    },

    /// Flow transition requested from the wrong screen
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Screenshot capture or encoding failed
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Configuration rejected
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an assertion mismatch
    #[must_use]
    pub fn mismatch(
        context: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::AssertionMismatch {
            context: context.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Classify the error for reporting
    #[must_use]
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::AssertionMismatch { .. } => FailureKind::Assertion,
            _ => FailureKind::Infrastructure,
        }
    }
}
