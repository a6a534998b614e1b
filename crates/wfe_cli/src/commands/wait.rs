//! Wait command.

use super::{load_config, styled_phase, timeout_or};
use crate::WaitFor;
use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use wfe_core::{Clients, Condition, ConditionWaiter, Workflow, WorkflowPhase};

/// Wait for a workflow to reach a condition.
pub fn run(
    config_path: &Path,
    namespace: Option<&str>,
    name: &str,
    condition: WaitFor,
    timeout: Option<u64>,
) -> Result<()> {
    let config = load_config(config_path, namespace)?;
    let condition = match condition {
        WaitFor::Started => Condition::started(timeout_or(timeout, config.timeouts.start())),
        WaitFor::Finished => Condition::finished(timeout_or(timeout, config.timeouts.finish())),
        WaitFor::Succeeded => Condition::phase(
            WorkflowPhase::Succeeded,
            timeout_or(timeout, config.timeouts.finish()),
        ),
        WaitFor::Failed => Condition::phase(
            WorkflowPhase::Failed,
            timeout_or(timeout, config.timeouts.finish()),
        ),
    };
    let clients = Clients::kubectl(config);

    let wf = wait_with_spinner(&clients, name, &condition)?;
    print_summary(&wf);
    Ok(())
}

/// Runs a condition wait behind a spinner.
pub(crate) fn wait_with_spinner(
    clients: &Clients,
    name: &str,
    condition: &Condition,
) -> Result<Workflow> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message(format!(
        "Waiting for {} {} (timeout {}s)",
        style(name).cyan(),
        condition.description(),
        condition.timeout().as_secs()
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = ConditionWaiter::new(clients.workflows.as_ref(), clients.hydrator.as_ref())
        .wait(name, condition);
    pb.finish_and_clear();

    match result {
        Ok(wf) => {
            println!(
                "{} {} {}",
                style("✓").green(),
                style(&wf.metadata.name).cyan(),
                condition.description()
            );
            Ok(wf)
        }
        Err(e) => {
            println!("{} {}", style("×").red(), e);
            if let Some(hint) = e.recovery_suggestion() {
                println!("  {} {}", style("Tip:").cyan(), hint);
            }
            Err(e.into())
        }
    }
}

pub(crate) fn print_summary(wf: &Workflow) {
    println!();
    println!("{}", style("Workflow:").bold());
    println!("  Name:    {}", style(&wf.metadata.name).cyan());
    println!("  Phase:   {}", styled_phase(wf.status.phase));
    if let (Some(started), Some(finished)) = (wf.status.started_at, wf.status.finished_at) {
        println!(
            "  Duration: {}s",
            (finished - started).num_seconds()
        );
    }
    if !wf.status.message.is_empty() {
        println!("  Message: {}", wf.status.message);
    }
    println!("  Nodes:   {}", wf.status.nodes.len());
}
