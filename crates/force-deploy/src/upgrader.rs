//! One-shot privileged upgrade gate.
//!
//! The original system ran one-off upgrade logic by deploying code over a
//! fixed system address, invoking it as a constructor and restoring the old
//! code afterwards.  Outside that execution model the same guarantee (the
//! routine runs at most once, atomically) is a function call behind a
//! one-time-use flag.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{DeployError, ExecLayer};

/// Runs a privileged upgrade routine against the execution layer at most
/// once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneShotUpgrader {
    executed: bool,
}

impl OneShotUpgrader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// Executes `routine` against the execution layer.
    ///
    /// Fails with [`DeployError::AlreadyExecuted`] on a second invocation.
    /// The routine runs on a staged copy; if it fails, neither the
    /// execution layer nor the one-time flag changes.
    pub fn run<F>(&mut self, exec: &mut ExecLayer, routine: F) -> Result<(), DeployError>
    where
        F: FnOnce(&mut ExecLayer) -> Result<(), DeployError>,
    {
        if self.executed {
            return Err(DeployError::AlreadyExecuted);
        }

        let mut staged = exec.clone();
        routine(&mut staged)?;
        *exec = staged;
        self.executed = true;
        info!("one-shot upgrade routine executed");
        Ok(())
    }
}
