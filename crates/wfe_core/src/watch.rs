//! Watch events and sessions.
//!
//! A [`WatchSession`] is an open server-side subscription. Events arrive on a
//! crossbeam channel so a waiter can `select!` between the stream and a timer.
//! [`WatchGuard`] owns a session and stops it exactly once, whichever way the
//! owner returns.

use crate::types::{Resource, Workflow};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of change a watch event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Object appeared.
    Added,
    /// Object changed.
    Modified,
    /// Object was removed.
    Deleted,
    /// The stream reported an error instead of an object.
    Error,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "ADDED",
            Self::Modified => "MODIFIED",
            Self::Deleted => "DELETED",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Status object the backend sends in place of a resource on error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    /// HTTP-style status code.
    #[serde(default)]
    pub code: Option<u16>,
    /// Machine-readable reason.
    #[serde(default)]
    pub reason: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Payload of a non-error watch event.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchObject {
    /// A decoded workflow snapshot.
    Workflow(Box<Workflow>),
    /// Anything else the stream delivered.
    Other {
        /// `apiVersion/kind` of the payload, or what was wrong with it.
        kind: String,
        /// Name, if the payload had one.
        name: String,
    },
}

impl WatchObject {
    /// Classifies a raw object from the stream.
    pub fn from_value(value: Value) -> Self {
        let api_version = value
            .get("apiVersion")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let name = value
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if kind != Workflow::KIND || api_version != Workflow::API_VERSION {
            return Self::Other {
                kind: format!("{}/{}", api_version, kind),
                name,
            };
        }
        match serde_json::from_value::<Workflow>(value) {
            Ok(wf) => Self::Workflow(Box::new(wf)),
            Err(e) => Self::Other {
                kind: format!("undecodable workflow ({})", e),
                name,
            },
        }
    }
}

/// One event from a watch stream.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// Object appeared.
    Added(WatchObject),
    /// Object changed.
    Modified(WatchObject),
    /// Object was removed.
    Deleted(WatchObject),
    /// The stream failed.
    Error(ApiStatus),
}

impl WatchEvent {
    /// The event's kind.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Added(_) => EventKind::Added,
            Self::Modified(_) => EventKind::Modified,
            Self::Deleted(_) => EventKind::Deleted,
            Self::Error(_) => EventKind::Error,
        }
    }

    /// Extracts the workflow snapshot, or describes what arrived instead.
    pub fn into_workflow(self) -> Result<Workflow, String> {
        let kind = self.kind();
        match self {
            Self::Added(obj) | Self::Modified(obj) | Self::Deleted(obj) => match obj {
                WatchObject::Workflow(wf) => Ok(*wf),
                WatchObject::Other { kind: other, name } => {
                    Err(format!("{} event carried {} '{}'", kind, other, name))
                }
            },
            Self::Error(status) => Err(format!(
                "{} event: {} ({})",
                kind, status.message, status.reason
            )),
        }
    }
}

/// An open watch subscription.
pub trait WatchSession: Send {
    /// Channel the session delivers events on. Disconnects when the stream ends.
    fn events(&self) -> &Receiver<WatchEvent>;

    /// Closes the subscription and releases its resources.
    fn stop(&mut self);
}

/// Owns a [`WatchSession`] and stops it exactly once.
pub struct WatchGuard {
    session: Box<dyn WatchSession>,
    stopped: bool,
}

impl WatchGuard {
    /// Takes ownership of an open session.
    pub fn new(session: Box<dyn WatchSession>) -> Self {
        Self {
            session,
            stopped: false,
        }
    }

    /// Channel of the underlying session.
    pub fn events(&self) -> &Receiver<WatchEvent> {
        self.session.events()
    }

    /// Stops the session now. Later calls and the drop are no-ops.
    pub fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.session.stop();
        }
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        self.stop();
    }
}
