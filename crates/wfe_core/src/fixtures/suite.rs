use super::given::Given;
use crate::client::Clients;
use crate::config::Config;
use crate::error::Result;
use std::time::Instant;
use tracing::{error, info, info_span};

/// Entry point for scenarios: owns the collaborator handles.
#[derive(Clone)]
pub struct Suite {
    clients: Clients,
}

impl Suite {
    /// Creates a suite over the given collaborators.
    pub fn new(clients: Clients) -> Self {
        Self { clients }
    }

    /// Creates a suite against a real cluster through kubectl.
    pub fn kubectl(config: Config) -> Self {
        Self::new(Clients::kubectl(config))
    }

    /// The collaborator handles.
    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    /// Starts a fresh scenario.
    pub fn given(&self) -> Given {
        Given::new(self.clients.clone())
    }

    /// Runs one named scenario and returns its first error.
    pub fn run<F>(&self, name: &str, scenario: F) -> Result<()>
    where
        F: FnOnce(Given) -> Result<()>,
    {
        let span = info_span!("scenario", name = %name);
        let _enter = span.enter();
        let start = Instant::now();

        match scenario(self.given()) {
            Ok(()) => {
                info!(elapsed_ms = start.elapsed().as_millis() as u64, "Scenario passed");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Scenario failed");
                if let Some(hint) = e.recovery_suggestion() {
                    info!("Hint: {}", hint);
                }
                Err(e)
            }
        }
    }
}
