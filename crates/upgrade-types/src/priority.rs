//! Queued priority-operation record.

use alloy_primitives::B256;
use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

/// One pending cross-layer request, as stored in the priority queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Arbitrary, Serialize, Deserialize)]
pub struct PriorityOperation {
    /// Canonical hash of the underlying L2 transaction.
    pub canonical_tx_hash: B256,

    /// Time (unix seconds) after which the operation is considered expired.
    pub expiration_timestamp: u64,
}
