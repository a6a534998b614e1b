//! External CLI invocation.

use crate::error::{Result, WfeError};
use std::process::Command;
use tracing::debug;

/// Output of a finished CLI process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutput {
    /// Command line that was run.
    pub command: String,
    /// Standard output followed by standard error.
    pub output: String,
    /// Exit code; `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl CliOutput {
    /// Returns true if the process exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Returns the output if the process succeeded, or a `CommandFailed` error.
    pub fn expect_success(&self) -> Result<&str> {
        if self.success() {
            Ok(&self.output)
        } else {
            Err(WfeError::CommandFailed {
                command: self.command.clone(),
                code: self.exit_code,
                stderr: self.output.clone(),
            })
        }
    }
}

/// Runs an external binary to completion.
pub trait CliRunner: Send + Sync {
    /// Runs `binary` with `args`.
    ///
    /// A non-zero exit is not an error here: it is reported in the output for
    /// the caller's block to judge. Only failing to start the process is.
    fn run(&self, binary: &str, args: &[String]) -> Result<CliOutput>;
}

/// Runs binaries as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CliRunner for ProcessRunner {
    fn run(&self, binary: &str, args: &[String]) -> Result<CliOutput> {
        let command = format!("{} {}", binary, args.join(" "));
        debug!(command = %command, "Running CLI");

        let out = Command::new(binary)
            .args(args)
            .output()
            .map_err(|e| WfeError::CommandStartFailed {
                command: binary.to_string(),
                reason: e.to_string(),
            })?;

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        Ok(CliOutput {
            command,
            output,
            exit_code: out.status.code(),
        })
    }
}
