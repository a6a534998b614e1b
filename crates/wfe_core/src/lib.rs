//! WFE Core Library
//!
//! An end-to-end test harness for a workflow engine, providing:
//! - Given/When/Then scenario phases with fail-fast chaining
//! - Waiting on a workflow condition over a watch, bounded by a timeout
//! - Hydration of compressed or offloaded node status
//! - A kubectl-backed client for running against a real cluster
//!
//! # Waiting on a condition
//!
//! A [`ConditionWaiter`] opens one watch scoped to harness-managed workflows
//! and races it against a timer. Each snapshot is hydrated before the
//! predicate sees it:
//!
//! ```no_run
//! use std::time::Duration;
//! use wfe_core::{Clients, Condition, ConditionWaiter, Config};
//!
//! # fn main() -> wfe_core::Result<()> {
//! let clients = Clients::kubectl(Config::default());
//! let waiter = ConditionWaiter::new(clients.workflows.as_ref(), clients.hydrator.as_ref());
//! let wf = waiter.wait("hello-abc12", &Condition::finished(Duration::from_secs(60)))?;
//! println!("{:?}", wf.status.phase);
//! # Ok(())
//! # }
//! ```
//!
//! # Collaborators
//!
//! Everything the harness talks to sits behind a trait: [`ResourceApi`],
//! [`WorkflowApi`], [`Hydrator`] and [`CliRunner`]. [`Clients`] bundles one
//! handle of each, so scenarios run unchanged against an in-memory fake.

mod cli;
mod client;
mod config;
mod error;
mod fixtures;
mod hydrator;
mod kubectl;
mod selector;
mod types;
mod wait;
mod watch;

pub use cli::{CliOutput, CliRunner, ProcessRunner};
pub use client::{Clients, ResourceApi, WorkflowApi};
pub use config::{CliConfig, Config, QuotaConfig, TimeoutConfig, CONFIG_FILE};
pub use error::{Result, WfeError};
pub use fixtures::{Given, Suite, Then, When};
pub use hydrator::{compress_nodes, decompress_nodes, Hydrator, NodeStatusHydrator, OffloadStore};
pub use kubectl::{Kubectl, KubectlApi};
pub use selector::{ListOptions, LABEL};
pub use types::*;
pub use wait::{Condition, ConditionWaiter, Predicate};
pub use watch::{ApiStatus, EventKind, WatchEvent, WatchGuard, WatchObject, WatchSession};
