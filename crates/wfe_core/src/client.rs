//! Collaborator interfaces the harness drives.
//!
//! The harness owns no storage. Everything it creates, reads, deletes or
//! watches goes through these traits, so scenarios run unchanged against a
//! real cluster (see [`crate::kubectl`]) or an in-memory fake.

use crate::cli::{CliRunner, ProcessRunner};
use crate::config::Config;
use crate::error::Result;
use crate::hydrator::{Hydrator, NodeStatusHydrator};
use crate::selector::ListOptions;
use crate::types::{
    ClusterWorkflowTemplate, ConfigMap, CronWorkflow, Resource, ResourceQuota, Workflow,
    WorkflowEventBinding, WorkflowTemplate,
};
use crate::watch::WatchSession;
use std::sync::Arc;

/// Create/get/list/delete calls for one kind of object.
pub trait ResourceApi<T: Resource>: Send + Sync {
    /// Creates an object and returns it as stored, with its assigned name.
    fn create(&self, obj: &T) -> Result<T>;

    /// Fetches an object by name.
    fn get(&self, name: &str) -> Result<T>;

    /// Lists objects matching the selectors.
    fn list(&self, opts: &ListOptions) -> Result<Vec<T>>;

    /// Deletes an object by name. Absent objects yield `WfeError::NotFound`.
    fn delete(&self, name: &str) -> Result<()>;
}

/// Workflow calls, including the watch the condition waiter relies on.
pub trait WorkflowApi: ResourceApi<Workflow> {
    /// Opens a watch scoped to the selectors.
    fn watch(&self, opts: &ListOptions) -> Result<Box<dyn WatchSession>>;
}

/// Handles to every collaborator a scenario uses.
///
/// Cheap to clone; phases move a copy forward on each transition.
#[derive(Clone)]
pub struct Clients {
    /// Harness configuration.
    pub config: Arc<Config>,
    /// Workflows.
    pub workflows: Arc<dyn WorkflowApi>,
    /// Workflow event bindings.
    pub event_bindings: Arc<dyn ResourceApi<WorkflowEventBinding>>,
    /// Workflow templates.
    pub templates: Arc<dyn ResourceApi<WorkflowTemplate>>,
    /// Cluster workflow templates.
    pub cluster_templates: Arc<dyn ResourceApi<ClusterWorkflowTemplate>>,
    /// Cron workflows.
    pub cron_workflows: Arc<dyn ResourceApi<CronWorkflow>>,
    /// Config maps.
    pub config_maps: Arc<dyn ResourceApi<ConfigMap>>,
    /// Resource quotas.
    pub quotas: Arc<dyn ResourceApi<ResourceQuota>>,
    /// Expands compressed or offloaded snapshots.
    pub hydrator: Arc<dyn Hydrator>,
    /// Runs the argo CLI.
    pub cli: Arc<dyn CliRunner>,
}

impl Clients {
    /// Builds clients backed by kubectl, using the binaries named in `config`.
    pub fn kubectl(config: Config) -> Self {
        let kubectl = crate::kubectl::Kubectl::new(&config.cli.kubectl, &config.namespace);
        Self {
            workflows: Arc::new(kubectl.api::<Workflow>()),
            event_bindings: Arc::new(kubectl.api::<WorkflowEventBinding>()),
            templates: Arc::new(kubectl.api::<WorkflowTemplate>()),
            cluster_templates: Arc::new(kubectl.api::<ClusterWorkflowTemplate>()),
            cron_workflows: Arc::new(kubectl.api::<CronWorkflow>()),
            config_maps: Arc::new(kubectl.api::<ConfigMap>()),
            quotas: Arc::new(kubectl.api::<ResourceQuota>()),
            hydrator: Arc::new(NodeStatusHydrator::new()),
            cli: Arc::new(ProcessRunner),
            config: Arc::new(config),
        }
    }
}
