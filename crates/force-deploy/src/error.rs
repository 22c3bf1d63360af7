//! Force-deployment errors.

use alloy_primitives::{Address, B256};
use cairn_primitives::BytecodeError;

/// Errors from the force-deployment coordinator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeployError {
    /// Caller is not allowed to request force deployments.
    #[error("caller {0} is not authorized to force deploy")]
    Unauthorized(Address),

    /// The referenced bytecode hash was never published.
    #[error("bytecode {0} is not known to the execution layer")]
    UnknownBytecode(B256),

    /// Structurally invalid bytecode or bytecode hash.
    #[error(transparent)]
    Bytecode(#[from] BytecodeError),

    /// Account metadata may only be changed by the account itself.
    #[error("caller {caller} cannot update account {account}")]
    NotSelf { caller: Address, account: Address },

    /// Nonce ordering can no longer be loosened.
    #[error("nonce ordering of {0} cannot be changed to arbitrary")]
    InvalidNonceOrderingChange(Address),

    /// The one-shot upgrader already ran.
    #[error("one-shot upgrade was already executed")]
    AlreadyExecuted,
}
