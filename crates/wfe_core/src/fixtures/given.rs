use super::when::When;
use crate::client::Clients;
use crate::error::{Result, WfeError};
use crate::selector::LABEL;
use crate::types::{
    ClusterWorkflowTemplate, CronWorkflow, Resource, Workflow, WorkflowEventBinding,
    WorkflowTemplate,
};
use std::fmt;
use std::fs;
use std::path::Path;

/// Objects prepared in the Given phase and not yet submitted.
#[derive(Debug, Clone, Default)]
pub(crate) struct Specs {
    pub(crate) workflow: Option<Workflow>,
    pub(crate) event_binding: Option<WorkflowEventBinding>,
    pub(crate) templates: Vec<WorkflowTemplate>,
    pub(crate) cluster_templates: Vec<ClusterWorkflowTemplate>,
    pub(crate) cron_workflow: Option<CronWorkflow>,
}

/// Setup phase: prepares objects locally, talks to nothing.
pub struct Given {
    clients: Clients,
    specs: Specs,
    workflow_name: String,
}

impl Given {
    /// Starts a scenario.
    pub fn new(clients: Clients) -> Self {
        Self {
            clients,
            specs: Specs::default(),
            workflow_name: String::new(),
        }
    }

    pub(crate) fn resume(clients: Clients, specs: Specs, workflow_name: String) -> Self {
        Self {
            clients,
            specs,
            workflow_name,
        }
    }

    // ===== Workflows =====

    /// Prepares an already-built workflow.
    pub fn workflow(mut self, mut wf: Workflow) -> Self {
        ensure_label(&mut wf);
        self.specs.workflow = Some(wf);
        self
    }

    /// Prepares a workflow from YAML, or from a file when `text` is `@path`.
    pub fn workflow_yaml(mut self, text: &str) -> Result<Self> {
        self.specs.workflow = Some(parse_manifest(text)?);
        Ok(self)
    }

    /// Prepares a workflow from a YAML file.
    pub fn workflow_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        self.workflow_yaml(&text)
    }

    /// Refers to a workflow that already exists, for waits and assertions.
    pub fn workflow_name(mut self, name: &str) -> Self {
        self.workflow_name = name.to_string();
        self
    }

    // ===== Other objects =====
    //
    // Each accepts YAML text, or `@path` to read it from a file.

    /// Prepares a workflow event binding.
    pub fn workflow_event_binding(mut self, text: &str) -> Result<Self> {
        self.specs.event_binding = Some(parse_manifest(text)?);
        Ok(self)
    }

    /// Adds a workflow template.
    pub fn workflow_template(mut self, text: &str) -> Result<Self> {
        self.specs.templates.push(parse_manifest(text)?);
        Ok(self)
    }

    /// Adds a cluster workflow template.
    pub fn cluster_workflow_template(mut self, text: &str) -> Result<Self> {
        self.specs.cluster_templates.push(parse_manifest(text)?);
        Ok(self)
    }

    /// Prepares a cron workflow.
    pub fn cron_workflow(mut self, text: &str) -> Result<Self> {
        self.specs.cron_workflow = Some(parse_manifest(text)?);
        Ok(self)
    }

    /// The workflow prepared so far, if any.
    pub fn prepared_workflow(&self) -> Option<&Workflow> {
        self.specs.workflow.as_ref()
    }

    /// Moves to the action phase.
    pub fn when(self) -> When {
        When::new(self.clients, self.specs, self.workflow_name)
    }
}

impl fmt::Debug for Given {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Given")
            .field("specs", &self.specs)
            .field("workflow_name", &self.workflow_name)
            .finish_non_exhaustive()
    }
}

/// Parses a manifest and marks it as managed by the harness.
fn parse_manifest<T: Resource>(text: &str) -> Result<T> {
    let yaml = match text.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)?,
        None => text.to_string(),
    };
    let mut obj: T = serde_yaml::from_str(&yaml)
        .map_err(|e| WfeError::Deserialization(format!("{} manifest: {}", T::KIND, e)))?;
    ensure_label(&mut obj);
    Ok(obj)
}

fn ensure_label<T: Resource>(obj: &mut T) {
    obj.metadata_mut()
        .labels
        .insert(LABEL.to_string(), "true".to_string());
}
