//! Force-deployment coordinator for execution-layer system contracts.
//!
//! Places bytecode, identified by its versioned content hash, at
//! predetermined addresses outside the normal deployment-derivation path.
//! Used at ecosystem genesis and by the upgrade machinery to swap system
//! contracts in place.  The one-shot upgrader replaces the original's
//! deploy/run/restore code-swapping trick with a one-time-use gate.

mod account;
mod deployer;
mod error;
mod upgrader;

pub use account::{AccountInfo, AccountNonceOrdering, AccountVersion, DeployEvent};
pub use deployer::{ExecLayer, ForceDeployment};
pub use error::DeployError;
pub use upgrader::OneShotUpgrader;
