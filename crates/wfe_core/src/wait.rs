//! Waiting for a workflow to reach a condition.
//!
//! A wait opens one watch scoped to harness-managed workflows (optionally a
//! single name), then selects between the event stream and a timer started
//! alongside it. Every event is hydrated before the predicate sees it. The
//! first snapshot that satisfies the predicate ends the wait; the timer firing
//! first is a timeout. Either way the watch is stopped before returning.

use crate::client::WorkflowApi;
use crate::error::{Result, WfeError};
use crate::hydrator::Hydrator;
use crate::selector::ListOptions;
use crate::types::{Workflow, WorkflowPhase};
use crate::watch::WatchGuard;
use crossbeam_channel::{after, select};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, info_span};

/// Predicate over a hydrated workflow snapshot.
pub type Predicate = Box<dyn Fn(&Workflow) -> bool + Send + Sync>;

/// A predicate with a human description and a deadline.
pub struct Condition {
    description: String,
    timeout: Duration,
    predicate: Predicate,
}

impl Condition {
    /// Creates a condition.
    pub fn new<F>(description: &str, timeout: Duration, predicate: F) -> Self
    where
        F: Fn(&Workflow) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.to_string(),
            timeout,
            predicate: Box::new(predicate),
        }
    }

    /// Met once the controller has recorded a start time.
    pub fn started(timeout: Duration) -> Self {
        Self::new("to start", timeout, |wf| wf.status.started_at.is_some())
    }

    /// Met once the controller has recorded a finish time.
    pub fn finished(timeout: Duration) -> Self {
        Self::new("to finish", timeout, |wf| wf.status.finished_at.is_some())
    }

    /// Met once the workflow reports `phase`.
    pub fn phase(phase: WorkflowPhase, timeout: Duration) -> Self {
        Self::new(&format!("to be {:?}", phase), timeout, move |wf| {
            wf.status.phase == phase
        })
    }

    /// Human description, used in logs and errors.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// How long to wait before failing.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Evaluates the predicate.
    pub fn is_met(&self, wf: &Workflow) -> bool {
        (self.predicate)(wf)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("description", &self.description)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Races a workflow watch against a timer.
pub struct ConditionWaiter<'a> {
    workflows: &'a dyn WorkflowApi,
    hydrator: &'a dyn Hydrator,
}

impl<'a> ConditionWaiter<'a> {
    /// Creates a waiter over the given collaborators.
    pub fn new(workflows: &'a dyn WorkflowApi, hydrator: &'a dyn Hydrator) -> Self {
        Self {
            workflows,
            hydrator,
        }
    }

    /// Blocks until a managed workflow named `name` satisfies `condition`.
    ///
    /// An empty `name` accepts any managed workflow. Returns the hydrated
    /// snapshot that satisfied the predicate.
    ///
    /// # Errors
    ///
    /// - [`WfeError::Timeout`] if the timer fires first
    /// - [`WfeError::UnexpectedObject`] if the stream delivers anything but a workflow
    /// - [`WfeError::WatchClosed`] if the stream ends first
    /// - any error from opening the watch or from hydration
    pub fn wait(&self, name: &str, condition: &Condition) -> Result<Workflow> {
        let start = Instant::now();
        let opts = ListOptions::managed(name);

        let span = info_span!(
            "wait",
            field_selector = %opts.field_selector,
            condition = %condition.description,
            timeout = ?condition.timeout,
        );
        let _enter = span.enter();
        info!("Waiting for condition");

        let mut watch = WatchGuard::new(self.workflows.watch(&opts)?);
        let events = watch.events().clone();
        let deadline = after(condition.timeout);

        loop {
            select! {
                recv(events) -> msg => {
                    let event = msg.map_err(|_| WfeError::WatchClosed {
                        condition: condition.description.clone(),
                    })?;
                    let kind = event.kind();
                    let mut wf = event.into_workflow().map_err(|detail| WfeError::UnexpectedObject {
                        condition: condition.description.clone(),
                        detail,
                    })?;
                    info!(
                        workflow = %wf.metadata.name,
                        event = %kind,
                        phase = ?wf.status.phase,
                        message = %wf.status.message,
                        "Workflow event"
                    );
                    self.hydrator.hydrate(&mut wf)?;
                    if condition.is_met(&wf) {
                        watch.stop();
                        info!("Condition met after {}s", start.elapsed().as_secs());
                        return Ok(wf);
                    }
                }
                recv(deadline) -> _ => {
                    watch.stop();
                    return Err(WfeError::Timeout {
                        condition: condition.description.clone(),
                        selector: opts.to_string(),
                        timeout: condition.timeout,
                        elapsed: start.elapsed(),
                    });
                }
            }
        }
    }
}
