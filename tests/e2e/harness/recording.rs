use std::sync::{Arc, Mutex};
use wfe_core::{CliOutput, CliRunner, Hydrator, NodeStatusHydrator, Result, WfeError, Workflow};

/// Shared, ordered record of what happened during a scenario.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

/// Hydrator that journals every call, then delegates to the real one.
///
/// Entries look like `hydrate:<name>@<resourceVersion>`.
pub struct RecordingHydrator {
    inner: NodeStatusHydrator,
    journal: Journal,
    fail_on: Mutex<Option<String>>,
}

impl RecordingHydrator {
    pub fn new(journal: Journal) -> Self {
        Self {
            inner: NodeStatusHydrator::new(),
            journal,
            fail_on: Mutex::new(None),
        }
    }

    /// Fails hydration of snapshots at this resource version.
    pub fn fail_on(&self, resource_version: &str) {
        *self.fail_on.lock().unwrap() = Some(resource_version.to_string());
    }
}

impl Hydrator for RecordingHydrator {
    fn hydrate(&self, wf: &mut Workflow) -> Result<()> {
        self.journal.push(format!(
            "hydrate:{}@{}",
            wf.metadata.name, wf.metadata.resource_version
        ));
        if self.fail_on.lock().unwrap().as_deref() == Some(wf.metadata.resource_version.as_str()) {
            return Err(WfeError::Hydration {
                name: wf.metadata.name.clone(),
                reason: "offload store unavailable".to_string(),
            });
        }
        self.inner.hydrate(wf)
    }
}

/// CLI runner that records invocations and replies with canned output.
#[derive(Debug, Default)]
pub struct StubCli {
    invocations: Mutex<Vec<(String, Vec<String>)>>,
    reply: Mutex<Option<(String, Option<i32>)>>,
    fail_to_start: Mutex<bool>,
}

impl StubCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, output: &str, exit_code: i32) {
        *self.reply.lock().unwrap() = Some((output.to_string(), Some(exit_code)));
    }

    pub fn fail_to_start(&self) {
        *self.fail_to_start.lock().unwrap() = true;
    }

    pub fn invocations(&self) -> Vec<(String, Vec<String>)> {
        self.invocations.lock().unwrap().clone()
    }
}

impl CliRunner for StubCli {
    fn run(&self, binary: &str, args: &[String]) -> Result<CliOutput> {
        self.invocations
            .lock()
            .unwrap()
            .push((binary.to_string(), args.to_vec()));
        if *self.fail_to_start.lock().unwrap() {
            return Err(WfeError::CommandStartFailed {
                command: binary.to_string(),
                reason: "No such file or directory".to_string(),
            });
        }
        let (output, exit_code) = self
            .reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| (String::new(), Some(0)));
        Ok(CliOutput {
            command: format!("{} {}", binary, args.join(" ")),
            output,
            exit_code,
        })
    }
}
