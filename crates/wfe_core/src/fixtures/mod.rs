//! Given/When/Then scenario phases.
//!
//! A scenario moves through three typed phases. `Given` prepares objects
//! locally, `When` acts on the cluster, `Then` checks the results. Each step
//! consumes its phase and returns it wrapped in a `Result`, so the first
//! failing step ends the scenario at the `?` that sees it:
//!
//! ```no_run
//! use std::time::Duration;
//! use wfe_core::{Config, Suite, WorkflowPhase};
//!
//! # fn main() -> wfe_core::Result<()> {
//! let suite = Suite::kubectl(Config::default());
//! suite
//!     .given()
//!     .workflow_file("smoke/basic.yaml")?
//!     .when()
//!     .submit_workflow()?
//!     .wait_for_workflow(Duration::from_secs(60))?
//!     .then()
//!     .expect_workflow(|wf| {
//!         if wf.status.phase == WorkflowPhase::Succeeded {
//!             Ok(())
//!         } else {
//!             Err(wfe_core::WfeError::assertion(format!("phase {:?}", wf.status.phase)))
//!         }
//!     })?;
//! # Ok(())
//! # }
//! ```

mod given;
mod suite;
mod then;
mod when;

pub use given::Given;
pub use suite::Suite;
pub use then::Then;
pub use when::When;
