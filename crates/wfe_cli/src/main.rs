//! WFE CLI - Command-line driver for the workflow end-to-end harness.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "wfe")]
#[command(about = "Submit, wait on and clean up workflows for end-to-end tests", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the harness configuration
    #[arg(long, global = true, default_value = wfe_core::CONFIG_FILE)]
    config: PathBuf,
    /// Override the configured namespace
    #[arg(short, long, global = true)]
    namespace: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a workflow manifest
    Submit {
        /// Workflow YAML file
        file: PathBuf,
        /// Wait for the workflow to finish
        #[arg(short, long)]
        wait: bool,
        /// Seconds to wait (defaults to the configured finish timeout)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Wait for a workflow to reach a condition
    Wait {
        /// Workflow name
        name: String,
        /// Condition to wait for
        #[arg(long = "for", value_enum, default_value = "finished")]
        condition: WaitFor,
        /// Seconds to wait (defaults to the configured timeout for the condition)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Delete a workflow
    Delete {
        /// Workflow name
        name: String,
        /// Succeed if the workflow is already gone
        #[arg(long)]
        ignore_not_found: bool,
    },
    /// Harness configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum WaitFor {
    /// The controller recorded a start time
    Started,
    /// The controller recorded a finish time
    Finished,
    /// The workflow succeeded
    Succeeded,
    /// The workflow failed
    Failed,
}

fn main() -> Result<()> {
    // Respects RUST_LOG (e.g. RUST_LOG=wfe_core=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let namespace = cli.namespace.as_deref();

    match cli.command {
        Commands::Submit {
            file,
            wait,
            timeout,
        } => commands::submit::run(&cli.config, namespace, &file, wait, timeout),
        Commands::Wait {
            name,
            condition,
            timeout,
        } => commands::wait::run(&cli.config, namespace, &name, condition, timeout),
        Commands::Delete {
            name,
            ignore_not_found,
        } => commands::delete::run(&cli.config, namespace, &name, ignore_not_found),
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config::show(&cli.config, namespace),
            ConfigCommands::Init { force } => commands::config::init(&cli.config, force),
        },
    }
}
