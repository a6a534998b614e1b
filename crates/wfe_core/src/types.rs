//! Resource types observed and created by the harness.
//!
//! Only the parts of each object the harness reads are typed. Specs are kept
//! as opaque JSON: the harness never interprets what a workflow does.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A kind of object the backend stores.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Kind, as reported in the object's `kind` field.
    const KIND: &'static str;
    /// Group/version, as reported in the object's `apiVersion` field.
    const API_VERSION: &'static str;
    /// Fully qualified resource name used on the kubectl command line.
    const PLURAL: &'static str;
    /// Whether objects of this kind live in a namespace.
    const NAMESPACED: bool = true;

    /// Object metadata.
    fn metadata(&self) -> &ObjectMeta;

    /// Mutable object metadata.
    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    /// The object's name.
    fn name(&self) -> &str {
        &self.metadata().name
    }
}

/// Identity and labels shared by every object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Object name. Empty until the backend assigns one from `generate_name`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Name prefix the backend completes on creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub generate_name: String,

    /// Namespace, empty for cluster-scoped objects.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    /// Unique instance id assigned by the backend.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,

    /// Resource version assigned by the backend.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_version: String,

    /// Labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Metadata with just a name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Workflow phase as reported by the controller.
///
/// Phases this harness does not know decode as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum WorkflowPhase {
    /// The controller has not touched the workflow yet.
    #[default]
    #[serde(rename = "")]
    Unknown,
    /// Accepted, not yet running.
    Pending,
    /// At least one node is running.
    Running,
    /// Completed successfully.
    Succeeded,
    /// Completed with a failing node.
    Failed,
    /// Completed with a controller error.
    Error,
}

impl From<String> for WorkflowPhase {
    fn from(phase: String) -> Self {
        match phase.as_str() {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Error" => Self::Error,
            _ => Self::Unknown,
        }
    }
}

/// Node phase. A superset of the workflow phases: nodes can also be skipped
/// or omitted. Unrecognized values decode as `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum NodePhase {
    #[default]
    #[serde(rename = "")]
    Unknown,
    Pending,
    Running,
    Succeeded,
    /// Not run because its `when` guard was false.
    Skipped,
    Failed,
    Error,
    /// Not run because a dependency never completed.
    Omitted,
}

impl From<String> for NodePhase {
    fn from(phase: String) -> Self {
        match phase.as_str() {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Skipped" => Self::Skipped,
            "Failed" => Self::Failed,
            "Error" => Self::Error,
            "Omitted" => Self::Omitted,
            _ => Self::Unknown,
        }
    }
}

/// Status of a single node in a workflow's execution graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    /// Node id.
    #[serde(default)]
    pub id: String,
    /// Fully qualified node name.
    #[serde(default)]
    pub name: String,
    /// Short display name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    /// Node type (Pod, Steps, DAG, ...).
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub node_type: String,
    /// Node phase.
    #[serde(default)]
    pub phase: NodePhase,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Finish time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Node statuses keyed by node id.
pub type Nodes = BTreeMap<String, NodeStatus>;

/// Workflow status section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    /// Current phase.
    #[serde(default)]
    pub phase: WorkflowPhase,
    /// Set once the controller starts the workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Set once the workflow completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Inline node statuses. Empty while the payload is compressed or offloaded.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nodes: Nodes,
    /// Base64 gzip JSON of `nodes`, when the controller compressed them.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub compressed_nodes: String,
    /// Version key of node status offloaded to the archive database.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub offload_node_status_version: String,
}

impl WorkflowStatus {
    /// Returns true if node status lives in the offload store.
    pub fn is_offloaded(&self) -> bool {
        !self.offload_node_status_version.is_empty()
    }
}

/// A workflow: the resource the harness waits on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Opaque spec.
    #[serde(default)]
    pub spec: Value,
    /// Status reported by the controller.
    #[serde(default)]
    pub status: WorkflowStatus,
}

/// Event binding that submits workflows in response to events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEventBinding {
    /// Metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Opaque spec.
    #[serde(default)]
    pub spec: Value,
}

/// Namespaced reusable workflow template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    /// Metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Opaque spec.
    #[serde(default)]
    pub spec: Value,
}

/// Cluster-scoped reusable workflow template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterWorkflowTemplate {
    /// Metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Opaque spec.
    #[serde(default)]
    pub spec: Value,
}

/// Status of a scheduled workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronWorkflowStatus {
    /// References to currently running workflows.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active: Vec<Value>,
    /// Last time a workflow was scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scheduled_time: Option<DateTime<Utc>>,
}

/// Workflow submitted on a schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CronWorkflow {
    /// Metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Opaque spec.
    #[serde(default)]
    pub spec: Value,
    /// Status.
    #[serde(default)]
    pub status: CronWorkflowStatus,
}

/// Named configuration object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMap {
    /// Metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// String data.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Spec of a hard resource quota.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuotaSpec {
    /// Hard limits keyed by resource name (`limits.memory`, `requests.storage`).
    #[serde(default)]
    pub hard: BTreeMap<String, String>,
}

/// Namespace resource quota.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuota {
    /// Metadata.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Spec.
    #[serde(default)]
    pub spec: ResourceQuotaSpec,
}

impl ResourceQuota {
    /// A quota with a single hard limit.
    pub fn hard(name: &str, resource: &str, quantity: &str) -> Self {
        let mut hard = BTreeMap::new();
        hard.insert(resource.to_string(), quantity.to_string());
        Self {
            metadata: ObjectMeta::named(name),
            spec: ResourceQuotaSpec { hard },
        }
    }
}

impl Resource for Workflow {
    const KIND: &'static str = "Workflow";
    const API_VERSION: &'static str = "argoproj.io/v1alpha1";
    const PLURAL: &'static str = "workflows.argoproj.io";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Resource for WorkflowEventBinding {
    const KIND: &'static str = "WorkflowEventBinding";
    const API_VERSION: &'static str = "argoproj.io/v1alpha1";
    const PLURAL: &'static str = "workfloweventbindings.argoproj.io";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Resource for WorkflowTemplate {
    const KIND: &'static str = "WorkflowTemplate";
    const API_VERSION: &'static str = "argoproj.io/v1alpha1";
    const PLURAL: &'static str = "workflowtemplates.argoproj.io";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Resource for ClusterWorkflowTemplate {
    const KIND: &'static str = "ClusterWorkflowTemplate";
    const API_VERSION: &'static str = "argoproj.io/v1alpha1";
    const PLURAL: &'static str = "clusterworkflowtemplates.argoproj.io";
    const NAMESPACED: bool = false;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Resource for CronWorkflow {
    const KIND: &'static str = "CronWorkflow";
    const API_VERSION: &'static str = "argoproj.io/v1alpha1";
    const PLURAL: &'static str = "cronworkflows.argoproj.io";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Resource for ConfigMap {
    const KIND: &'static str = "ConfigMap";
    const API_VERSION: &'static str = "v1";
    const PLURAL: &'static str = "configmaps";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

impl Resource for ResourceQuota {
    const KIND: &'static str = "ResourceQuota";
    const API_VERSION: &'static str = "v1";
    const PLURAL: &'static str = "resourcequotas";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
