//! Error types for wfe_core operations.

use std::time::Duration;
use thiserror::Error;

/// Core error type for harness operations.
///
/// Every variant is fatal for the scenario that produced it. The only
/// classification callers may branch on is [`WfeError::is_not_found`], which
/// cleanup and upsert paths use to tolerate already-absent objects.
#[derive(Error, Debug)]
pub enum WfeError {
    /// A chain step was invoked without the state it needs.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The backend has no object with this name.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Resource kind
        kind: String,
        /// Resource name
        name: String,
    },

    /// The backend rejected or failed a request.
    #[error("{kind} '{name}': {message}")]
    Api {
        /// Resource kind
        kind: String,
        /// Resource name (may be empty for list/watch calls)
        name: String,
        /// Backend message
        message: String,
    },

    /// An external binary could not be started.
    #[error("failed to start '{command}': {reason}")]
    CommandStartFailed {
        /// Program name
        command: String,
        /// Reason reported by the OS
        reason: String,
    },

    /// An external binary exited unsuccessfully.
    #[error("'{command}' exited with {code:?}: {stderr}")]
    CommandFailed {
        /// Full command line
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The watch stream delivered something that is not a workflow.
    #[error("unexpected watch object while waiting for condition {condition}: {detail}")]
    UnexpectedObject {
        /// Condition description
        condition: String,
        /// What was received instead
        detail: String,
    },

    /// The watch stream ended before the condition was met.
    #[error("watch closed while waiting for condition {condition}")]
    WatchClosed {
        /// Condition description
        condition: String,
    },

    /// The condition was not met in time.
    #[error("timeout after {timeout:?} waiting for condition {condition} (selector: {selector}, elapsed: {elapsed:?})")]
    Timeout {
        /// Condition description
        condition: String,
        /// Selector the watch was scoped to
        selector: String,
        /// Configured timeout
        timeout: Duration,
        /// Time actually spent waiting
        elapsed: Duration,
    },

    /// Expanding an offloaded or compressed payload failed.
    #[error("hydration failed for workflow '{name}': {reason}")]
    Hydration {
        /// Workflow name
        name: String,
        /// Underlying failure
        reason: String,
    },

    /// Serialization error while encoding an object.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error while decoding an object.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A caller-supplied assertion block failed.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WfeError {
    /// Builds an assertion failure, for use inside `and`/`expect_*` blocks.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// Returns true if the backend reported the object as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } => Some(
                "Check the workflow controller is running and the workflow carries the argo-e2e label.",
            ),
            Self::UnexpectedObject { .. } => {
                Some("The watch returned a foreign object; check the CRDs installed in the cluster.")
            }
            Self::CommandStartFailed { .. } => {
                Some("Ensure kubectl and the argo CLI are on PATH or configured in wfe.toml.")
            }
            Self::Hydration { .. } => {
                Some("Offloaded node status needs an offload store; check the archive database.")
            }
            Self::Precondition(_) => Some("Prepare the object in the Given phase before using it."),
            _ => None,
        }
    }
}

/// Convenience Result type for wfe_core operations.
pub type Result<T> = std::result::Result<T, WfeError>;
