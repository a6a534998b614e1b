//! Submit command.

use super::wait::{print_summary, wait_with_spinner};
use super::{load_config, timeout_or};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use wfe_core::{Condition, Suite};

/// Submit a workflow manifest, optionally waiting for it to finish.
pub fn run(
    config_path: &Path,
    namespace: Option<&str>,
    file: &Path,
    wait: bool,
    timeout: Option<u64>,
) -> Result<()> {
    let config = load_config(config_path, namespace)?;
    let finish = timeout_or(timeout, config.timeouts.finish());
    let suite = Suite::kubectl(config);

    println!(
        "{} Submitting {}...",
        style("→").cyan(),
        style(file.display()).cyan()
    );
    let when = suite
        .given()
        .workflow_file(file)
        .with_context(|| format!("failed to read workflow from {}", file.display()))?
        .when()
        .submit_workflow()?;
    let name = when.workflow_name().to_string();
    println!("{} Submitted {}", style("✓").green(), style(&name).cyan().bold());

    if wait {
        let wf = wait_with_spinner(suite.clients(), &name, &Condition::finished(finish))?;
        print_summary(&wf);
    }
    Ok(())
}
