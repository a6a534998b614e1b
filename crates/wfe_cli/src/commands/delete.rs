//! Delete command.

use super::load_config;
use anyhow::Result;
use console::style;
use std::path::Path;
use wfe_core::Clients;

/// Delete a workflow by name.
pub fn run(
    config_path: &Path,
    namespace: Option<&str>,
    name: &str,
    ignore_not_found: bool,
) -> Result<()> {
    let clients = Clients::kubectl(load_config(config_path, namespace)?);

    match clients.workflows.delete(name) {
        Ok(()) => {
            println!("{} Deleted {}", style("✓").green(), style(name).cyan());
            Ok(())
        }
        Err(e) if e.is_not_found() && ignore_not_found => {
            println!("{} {} already gone", style("ℹ").blue(), style(name).cyan());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
