use super::given::{Given, Specs};
use super::then::Then;
use crate::cli::CliOutput;
use crate::client::Clients;
use crate::error::{Result, WfeError};
use crate::types::{ConfigMap, ObjectMeta, Resource, ResourceQuota, Workflow};
use crate::wait::{Condition, ConditionWaiter};
use std::collections::BTreeMap;
use std::fmt;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Action phase: creates, mutates and waits on objects.
///
/// Every step consumes the phase and hands it back on success, so a failing
/// step ends the chain at the `?` that observed it.
pub struct When {
    clients: Clients,
    specs: Specs,
    workflow_name: String,
    template_names: Vec<String>,
    cron_workflow_name: String,
    config_map: Option<ConfigMap>,
    resource_quota: Option<ResourceQuota>,
    storage_quota: Option<ResourceQuota>,
}

impl When {
    pub(crate) fn new(clients: Clients, specs: Specs, workflow_name: String) -> Self {
        Self {
            clients,
            specs,
            workflow_name,
            template_names: Vec::new(),
            cron_workflow_name: String::new(),
            config_map: None,
            resource_quota: None,
            storage_quota: None,
        }
    }

    /// Name of the current workflow: the last one submitted or waited for.
    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    // ===== Creation =====

    /// Submits the prepared workflow.
    pub fn submit_workflow(mut self) -> Result<Self> {
        let wf = self
            .specs
            .workflow
            .as_ref()
            .ok_or_else(|| WfeError::Precondition("No workflow to submit".into()))?;
        info!(workflow = %display_name(wf), "Submitting workflow");
        let created = self.clients.workflows.create(wf)?;
        info!(workflow = %created.metadata.name, uid = %created.metadata.uid, "Workflow submitted");
        self.workflow_name = created.metadata.name;
        Ok(self)
    }

    /// Creates the prepared workflow event binding.
    pub fn create_workflow_event_binding(self) -> Result<Self> {
        let binding = self
            .specs
            .event_binding
            .as_ref()
            .ok_or_else(|| WfeError::Precondition("No workflow event to create".into()))?;
        info!(event = %binding.name(), "Creating workflow event");
        self.clients.event_bindings.create(binding)?;
        Ok(self)
    }

    /// Creates every prepared workflow template.
    pub fn create_workflow_templates(mut self) -> Result<Self> {
        if self.specs.templates.is_empty() {
            return Err(WfeError::Precondition(
                "No workflow templates to create".into(),
            ));
        }
        for template in &self.specs.templates {
            info!(template = %template.name(), "Creating workflow template");
            let created = self.clients.templates.create(template)?;
            info!(template = %created.name(), "Workflow template created");
            self.template_names.push(created.metadata.name);
        }
        Ok(self)
    }

    /// Creates every prepared cluster workflow template.
    pub fn create_cluster_workflow_templates(mut self) -> Result<Self> {
        if self.specs.cluster_templates.is_empty() {
            return Err(WfeError::Precondition(
                "No cluster workflow templates to create".into(),
            ));
        }
        for template in &self.specs.cluster_templates {
            info!(template = %template.name(), "Creating cluster workflow template");
            let created = self.clients.cluster_templates.create(template)?;
            info!(template = %created.name(), "Cluster workflow template created");
            self.template_names.push(created.metadata.name);
        }
        Ok(self)
    }

    /// Creates the prepared cron workflow.
    pub fn create_cron_workflow(mut self) -> Result<Self> {
        let cron = self
            .specs
            .cron_workflow
            .as_ref()
            .ok_or_else(|| WfeError::Precondition("No cron workflow to create".into()))?;
        info!(cron_workflow = %cron.name(), "Creating cron workflow");
        let created = self.clients.cron_workflows.create(cron)?;
        info!(uid = %created.metadata.uid, "Cron workflow created");
        self.cron_workflow_name = created.metadata.name;
        Ok(self)
    }

    // ===== Waiting =====

    /// Waits for the current workflow to satisfy `condition`.
    pub fn wait_for(self, condition: Condition) -> Result<Self> {
        let name = self.workflow_name.clone();
        self.wait_for_named(&name, condition)
    }

    /// Waits for the current workflow to satisfy `predicate`.
    pub fn wait_for_workflow_condition<F>(
        self,
        predicate: F,
        condition: &str,
        timeout: Duration,
    ) -> Result<Self>
    where
        F: Fn(&Workflow) -> bool + Send + Sync + 'static,
    {
        self.wait_for(Condition::new(condition, timeout, predicate))
    }

    /// Waits for the current workflow to start.
    pub fn wait_for_workflow_to_start(self, timeout: Duration) -> Result<Self> {
        self.wait_for(Condition::started(timeout))
    }

    /// Waits for the current workflow to finish.
    pub fn wait_for_workflow(self, timeout: Duration) -> Result<Self> {
        self.wait_for(Condition::finished(timeout))
    }

    /// Waits for the named workflow to finish and makes it current.
    pub fn wait_for_workflow_name(self, name: &str, timeout: Duration) -> Result<Self> {
        self.wait_for_named(name, Condition::finished(timeout))
    }

    fn wait_for_named(mut self, name: &str, condition: Condition) -> Result<Self> {
        let wf = ConditionWaiter::new(
            self.clients.workflows.as_ref(),
            self.clients.hydrator.as_ref(),
        )
        .wait(name, &condition)?;
        self.workflow_name = wf.metadata.name;
        Ok(self)
    }

    /// Sleeps for a fixed time.
    pub fn wait(self, duration: Duration) -> Self {
        info!("Waiting for {:?}", duration);
        thread::sleep(duration);
        info!("Done waiting");
        self
    }

    // ===== Deletion =====

    /// Deletes the current workflow.
    pub fn delete_workflow(self) -> Result<Self> {
        info!(workflow = %self.workflow_name, "Deleting");
        self.clients.workflows.delete(&self.workflow_name)?;
        Ok(self)
    }

    // ===== Escape hatches =====

    /// Runs a caller block; its error ends the scenario.
    pub fn and<F>(self, block: F) -> Result<Self>
    where
        F: FnOnce() -> Result<()>,
    {
        block()?;
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

    // ===== Config maps and quotas =====

    /// Creates a config map, replacing any existing one with the same name.
    pub fn create_config_map(mut self, name: &str, data: BTreeMap<String, String>) -> Result<Self> {
        match self.clients.config_maps.delete(name) {
            Ok(()) => info!(config_map = %name, "Deleted existing config map"),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        let config_map = ConfigMap {
            metadata: ObjectMeta::named(name),
            data,
        };
        let created = self.clients.config_maps.create(&config_map)?;
        info!(config_map = %created.name(), "Config map created");
        self.config_map = Some(created);
        Ok(self)
    }

    /// Deletes the config map created by `create_config_map`. Tolerates it being gone.
    pub fn delete_config_map(mut self) -> Result<Self> {
        let config_map = self
            .config_map
            .take()
            .ok_or_else(|| WfeError::Precondition("No config map to delete".into()))?;
        match self.clients.config_maps.delete(config_map.name()) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        Ok(self)
    }

    /// Creates a hard memory-limit quota.
    pub fn memory_quota(mut self, quota: &str) -> Result<Self> {
        let wanted = ResourceQuota::hard(
            &self.clients.config.quotas.memory_name,
            "limits.memory",
            quota,
        );
        info!(quota = %quota, "Creating memory quota");
        self.resource_quota = Some(self.clients.quotas.create(&wanted)?);
        Ok(self)
    }

    /// Creates a hard storage-request quota.
    pub fn storage_quota(mut self, quota: &str) -> Result<Self> {
        let wanted = ResourceQuota::hard(
            &self.clients.config.quotas.storage_name,
            "requests.storage",
            quota,
        );
        info!(quota = %quota, "Creating storage quota");
        self.storage_quota = Some(self.clients.quotas.create(&wanted)?);
        Ok(self)
    }

    /// Deletes the storage quota.
    pub fn delete_storage_quota(mut self) -> Result<Self> {
        let quota = self
            .storage_quota
            .take()
            .ok_or_else(|| WfeError::Precondition("No storage quota to delete".into()))?;
        self.clients.quotas.delete(quota.name())?;
        Ok(self)
    }

    /// Deletes the memory quota.
    pub fn delete_quota(mut self) -> Result<Self> {
        let quota = self
            .resource_quota
            .take()
            .ok_or_else(|| WfeError::Precondition("No memory quota to delete".into()))?;
        self.clients.quotas.delete(quota.name())?;
        Ok(self)
    }

    // ===== Transitions =====

    /// Moves to the assertion phase, keeping only names and handles.
    pub fn then(self) -> Then {
        Then::new(
            self.clients,
            self.workflow_name,
            self.template_names,
            self.cron_workflow_name,
        )
    }

    /// Returns to the setup phase with the prepared objects.
    pub fn given(self) -> Given {
        Given::resume(self.clients, self.specs, self.workflow_name)
    }
}

impl fmt::Debug for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("When")
            .field("workflow_name", &self.workflow_name)
            .field("template_names", &self.template_names)
            .field("cron_workflow_name", &self.cron_workflow_name)
            .finish_non_exhaustive()
    }
}

/// Runs the configured argo binary with `-n <namespace>` prepended.
pub(crate) fn run_argo(clients: &Clients, args: &[&str]) -> Result<CliOutput> {
    let mut full = vec!["-n".to_string(), clients.config.namespace.clone()];
    full.extend(args.iter().map(|a| a.to_string()));
    clients.cli.run(&clients.config.cli.argo, &full)
}

fn display_name(wf: &Workflow) -> &str {
    if wf.metadata.name.is_empty() {
        &wf.metadata.generate_name
    } else {
        &wf.metadata.name
    }
}
