use super::when::run_argo;
use crate::cli::CliOutput;
use crate::client::Clients;
use crate::error::{Result, WfeError};
use crate::selector::ListOptions;
use crate::types::{CronWorkflow, Workflow};
use std::fmt;
use tracing::{debug, info};

/// Assertion phase: fetches objects and hands them to caller blocks.
pub struct Then {
    clients: Clients,
    workflow_name: String,
    template_names: Vec<String>,
    cron_workflow_name: String,
}

impl Then {
    pub(crate) fn new(
        clients: Clients,
        workflow_name: String,
        template_names: Vec<String>,
        cron_workflow_name: String,
    ) -> Self {
        Self {
            clients,
            workflow_name,
            template_names,
            cron_workflow_name,
        }
    }

    /// Name of the current workflow.
    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    /// Names of the templates created in the action phase.
    pub fn template_names(&self) -> &[String] {
        &self.template_names
    }

    /// Checks the current workflow.
    pub fn expect_workflow<F>(self, block: F) -> Result<Self>
    where
        F: FnOnce(&Workflow) -> Result<()>,
    {
        let name = self.workflow_name.clone();
        self.expect_workflow_name(&name, block)
    }

    /// Checks the named workflow, hydrated.
    pub fn expect_workflow_name<F>(self, name: &str, block: F) -> Result<Self>
    where
        F: FnOnce(&Workflow) -> Result<()>,
    {
        if name.is_empty() {
            return Err(WfeError::Precondition("No workflow to check".into()));
        }
        info!(workflow = %name, "Checking expectation");
        let mut wf = self.clients.workflows.get(name)?;
        self.clients.hydrator.hydrate(&mut wf)?;
        debug!(phase = ?wf.status.phase, nodes = wf.status.nodes.len(), "Fetched workflow");
        block(&wf)?;
        Ok(self)
    }

    /// Checks the cron workflow created in the action phase.
    pub fn expect_cron<F>(self, block: F) -> Result<Self>
    where
        F: FnOnce(&CronWorkflow) -> Result<()>,
    {
        if self.cron_workflow_name.is_empty() {
            return Err(WfeError::Precondition("No cron workflow to check".into()));
        }
        info!(cron_workflow = %self.cron_workflow_name, "Checking cron expectation");
        let cron = self.clients.cron_workflows.get(&self.cron_workflow_name)?;
        block(&cron)?;
        Ok(self)
    }

    /// Checks every workflow matching `opts`, each hydrated.
    pub fn expect_workflow_list<F>(self, opts: &ListOptions, block: F) -> Result<Self>
    where
        F: FnOnce(&[Workflow]) -> Result<()>,
    {
        info!(selector = %opts, "Listing workflows");
        let mut list = self.clients.workflows.list(opts)?;
        for wf in &mut list {
            self.clients.hydrator.hydrate(wf)?;
        }
        block(&list)?;
        Ok(self)
    }

    /// Runs the argo CLI in the harness namespace and hands the output to `block`.
    pub fn run_cli<F>(self, args: &[&str], block: F) -> Result<Self>
    where
        F: FnOnce(&CliOutput) -> Result<()>,
    {
        let output = run_argo(&self.clients, args)?;
        block(&output)?;
        Ok(self)
    }

    /// Runs a caller block; its error ends the scenario.
    pub fn and<F>(self, block: F) -> Result<Self>
    where
        F: FnOnce() -> Result<()>,
    {
        block()?;
        Ok(self)
    }
}

impl fmt::Debug for Then {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Then")
            .field("workflow_name", &self.workflow_name)
            .field("template_names", &self.template_names)
            .field("cron_workflow_name", &self.cron_workflow_name)
            .finish_non_exhaustive()
    }
}
