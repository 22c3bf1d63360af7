//! The upgrade proposal consumed by the state machine.

use alloy_primitives::{Address, Bytes, B256};
use arbitrary::Arbitrary;
use cairn_primitives::ProtocolVersion;
use serde::{Deserialize, Serialize};

use crate::{L2CanonicalTransaction, VerifierParams};

/// A single, complete upgrade proposal.
///
/// Constructed by governance tooling, consumed exactly once by the upgrade
/// state machine and never persisted beyond the completion event.  Zero
/// values in `bootloader_hash`, `default_account_hash`, `verifier` and
/// `verifier_params` mean "leave the current value unchanged".
#[derive(Clone, Debug, Default, PartialEq, Eq, Arbitrary, Serialize, Deserialize)]
pub struct ProposedUpgrade {
    /// The mandatory system-upgrade transaction, or the noop sentinel
    /// (`tx_type == 0`) when the upgrade has no L2 side.
    pub l2_protocol_upgrade_tx: L2CanonicalTransaction,

    /// Preimages of the factory dependencies the transaction publishes.
    /// Must match `l2_protocol_upgrade_tx.factory_deps` hash-for-hash.
    pub factory_deps: Vec<Bytes>,

    /// New bootloader bytecode hash, or zero to keep the current one.
    pub bootloader_hash: B256,

    /// New default-account bytecode hash, or zero to keep the current one.
    pub default_account_hash: B256,

    /// New verifier reference, or zero to keep the current one.
    pub verifier: Address,

    /// New recursion vk hashes, or all-zero to keep the current ones.
    pub verifier_params: VerifierParams,

    /// Opaque payload for the custom L1-contracts upgrade hook.
    pub l1_contracts_upgrade_calldata: Bytes,

    /// Opaque payload for the post-upgrade hook.
    pub post_upgrade_calldata: Bytes,

    /// Earliest time (unix seconds) the upgrade may execute.
    pub upgrade_timestamp: u64,

    /// The version this proposal transitions to.
    pub new_protocol_version: ProtocolVersion,
}
