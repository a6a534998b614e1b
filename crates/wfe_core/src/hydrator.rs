//! Expansion of compressed or offloaded workflow node status.
//!
//! Large workflows don't carry their node graph inline. The controller either
//! gzips it into `status.compressedNodes` or moves it to the archive database
//! and leaves a version key in `status.offloadNodeStatusVersion`. Predicates
//! and assertions always see the expanded form.

use crate::error::{Result, WfeError};
use crate::types::{Nodes, Workflow};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Expands a workflow snapshot in place.
pub trait Hydrator: Send + Sync {
    /// Materializes `status.nodes`. Fails if the backing payload can't be read.
    fn hydrate(&self, wf: &mut Workflow) -> Result<()>;
}

/// Archive of offloaded node status.
pub trait OffloadStore: Send + Sync {
    /// Fetches the node status stored for a workflow uid and version.
    fn get(&self, uid: &str, version: &str) -> Result<Nodes>;
}

/// Standard hydrator: decompresses inline payloads, fetches offloaded ones.
#[derive(Clone, Default)]
pub struct NodeStatusHydrator {
    offload: Option<Arc<dyn OffloadStore>>,
}

impl NodeStatusHydrator {
    /// Hydrator without an offload store. Offloaded workflows fail to hydrate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrator that fetches offloaded node status from `store`.
    pub fn with_offload_store(store: Arc<dyn OffloadStore>) -> Self {
        Self {
            offload: Some(store),
        }
    }
}

impl Hydrator for NodeStatusHydrator {
    fn hydrate(&self, wf: &mut Workflow) -> Result<()> {
        if wf.status.is_offloaded() {
            let store = self.offload.as_ref().ok_or_else(|| WfeError::Hydration {
                name: wf.metadata.name.clone(),
                reason: "node status is offloaded but no offload store is configured".into(),
            })?;
            let nodes = store
                .get(&wf.metadata.uid, &wf.status.offload_node_status_version)
                .map_err(|e| WfeError::Hydration {
                    name: wf.metadata.name.clone(),
                    reason: e.to_string(),
                })?;
            debug!(
                workflow = %wf.metadata.name,
                version = %wf.status.offload_node_status_version,
                nodes = nodes.len(),
                "Fetched offloaded node status"
            );
            wf.status.nodes = nodes;
            wf.status.offload_node_status_version.clear();
        }

        if !wf.status.compressed_nodes.is_empty() {
            let nodes =
                decompress_nodes(&wf.status.compressed_nodes).map_err(|reason| WfeError::Hydration {
                    name: wf.metadata.name.clone(),
                    reason,
                })?;
            debug!(
                workflow = %wf.metadata.name,
                nodes = nodes.len(),
                "Decompressed node status"
            );
            wf.status.nodes = nodes;
            wf.status.compressed_nodes.clear();
        }

        Ok(())
    }
}

/// Encodes node status the way the controller stores `compressedNodes`.
pub fn compress_nodes(nodes: &Nodes) -> Result<String> {
    let json = serde_json::to_vec(nodes).map_err(|e| WfeError::Serialization(e.to_string()))?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let gz = encoder.finish()?;
    Ok(STANDARD.encode(gz))
}

/// Decodes a `compressedNodes` payload.
pub fn decompress_nodes(encoded: &str) -> std::result::Result<Nodes, String> {
    let gz = STANDARD
        .decode(encoded.trim())
        .map_err(|e| format!("invalid base64: {}", e))?;
    serde_json::from_reader(GzDecoder::new(gz.as_slice()))
        .map_err(|e| format!("invalid compressed nodes: {}", e))
}
