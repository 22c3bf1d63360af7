//! Protocol events, the sole audit trail of historical state.

use alloy_primitives::{Address, B256};
use cairn_primitives::ProtocolVersion;
use cairn_upgrade_types::{ProposedUpgrade, VerifierParams};
use serde::{Deserialize, Serialize};

/// An entry in the append-only protocol event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolEvent {
    /// The protocol version changed.
    NewProtocolVersion {
        old: ProtocolVersion,
        new: ProtocolVersion,
    },

    /// The bootloader bytecode hash changed.
    NewL2BootloaderBytecodeHash { old: B256, new: B256 },

    /// The default-account bytecode hash changed.
    NewL2DefaultAccountBytecodeHash { old: B256, new: B256 },

    /// The verifier reference changed.
    NewVerifier { old: Address, new: Address },

    /// The recursion vk hashes changed.
    NewVerifierParams {
        old: VerifierParams,
        new: VerifierParams,
    },

    /// An upgrade completed.  Carries the full proposal for auditability.
    UpgradeComplete {
        new_version: ProtocolVersion,
        tx_hash: B256,
        proposal: Box<ProposedUpgrade>,
    },

    /// A priority transaction was accepted into the queue.
    NewPriorityRequest {
        tx_id: u64,
        tx_hash: B256,
        expiration_timestamp: u64,
    },
}
