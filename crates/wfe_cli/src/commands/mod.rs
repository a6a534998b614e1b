//! CLI commands.

pub mod config;
pub mod delete;
pub mod submit;
pub mod wait;

use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::time::Duration;
use wfe_core::{Config, WorkflowPhase};

/// Loads the configuration, applying a namespace override.
pub(crate) fn load_config(path: &Path, namespace: Option<&str>) -> Result<Config> {
    let mut config = Config::load(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    if let Some(ns) = namespace {
        config.namespace = ns.to_string();
    }
    Ok(config)
}

pub(crate) fn timeout_or(secs: Option<u64>, default: Duration) -> Duration {
    secs.map(Duration::from_secs).unwrap_or(default)
}

/// Renders a phase in its conventional color.
pub(crate) fn styled_phase(phase: WorkflowPhase) -> String {
    let text = format!("{:?}", phase);
    match phase {
        WorkflowPhase::Succeeded => style(text).green().to_string(),
        WorkflowPhase::Failed | WorkflowPhase::Error => style(text).red().to_string(),
        WorkflowPhase::Running => style(text).cyan().to_string(),
        WorkflowPhase::Pending | WorkflowPhase::Unknown => style(text).yellow().to_string(),
    }
}
