//! Config commands.

use super::load_config;
use anyhow::{bail, Result};
use console::style;
use std::path::Path;
use wfe_core::Config;

/// Print the effective configuration.
pub fn show(path: &Path, namespace: Option<&str>) -> Result<()> {
    let config = load_config(path, namespace)?;
    if !path.exists() {
        println!(
            "{} {} not found, showing defaults",
            style("ℹ").blue(),
            path.display()
        );
    }

    println!("{}", style("Configuration:").bold());
    println!("  Namespace:      {}", style(&config.namespace).cyan());
    println!("  kubectl:        {}", config.cli.kubectl);
    println!("  argo:           {}", config.cli.argo);
    println!("  Start timeout:  {}s", config.timeouts.start_secs);
    println!("  Finish timeout: {}s", config.timeouts.finish_secs);
    println!("  Memory quota:   {}", config.quotas.memory_name);
    println!("  Storage quota:  {}", config.quotas.storage_name);
    Ok(())
}

/// Write a default configuration file.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save(path)?;
    println!("{} Wrote {}", style("✓").green(), style(path.display()).cyan());
    Ok(())
}
