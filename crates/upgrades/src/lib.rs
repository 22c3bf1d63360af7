//! The protocol-upgrade state machine.
//!
//! One call to [`upgrade`] plays out a whole [`ProposedUpgrade`]: timing
//! gate, version transition, verifier and system-bytecode updates, the
//! mandatory L2 system-upgrade transaction, and the custom hooks.  The call
//! is transactional: any failure at any step aborts everything and the
//! committed state never observes a partial upgrade.
//!
//! [`ProposedUpgrade`]: cairn_upgrade_types::ProposedUpgrade

mod error;
mod handler;
mod machine;
pub mod validator;

pub use error::{TxValidationError, UpgradeError};
pub use handler::{NoopHandler, UpgradeHandler};
pub use machine::{execute_upgrade, upgrade, UpgradeContext};
