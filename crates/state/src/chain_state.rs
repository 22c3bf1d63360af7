//! The persistent chain state record.

use alloy_primitives::{Address, B256, U256};
use cairn_primitives::{constants::PRIORITY_OPERATION_L2_TX_TYPE, ProtocolVersion};
use cairn_priority_queue::PriorityQueue;
use cairn_upgrade_types::{L2CanonicalTransaction, PriorityOperation, VerifierParams};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ProtocolEvent;

/// Errors from direct chain-state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A priority request carried the wrong transaction type.
    #[error("priority request has tx type {got}, expected {PRIORITY_OPERATION_L2_TX_TYPE}")]
    InvalidPriorityTxType { got: U256 },

    /// Upgrade-transaction bookkeeping attempted with no upgrade pending.
    #[error("no system-upgrade transaction is pending")]
    NoPendingUpgradeTx,

    /// The batch number for a pending upgrade transaction was already set.
    #[error("upgrade transaction already recorded in batch {0}")]
    UpgradeTxAlreadyIncluded(u64),

    /// Batch number zero is the "not included" sentinel and cannot be
    /// recorded.
    #[error("batch number zero is reserved")]
    BatchNumberZero,
}

/// Global persistent state of the governance layer.
///
/// Field visibility is deliberately private: multi-step mutations go through
/// [`crate::StateCache`], single-shot operations through the methods here,
/// and both append to the event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    pub(crate) protocol_version: ProtocolVersion,
    pub(crate) verifier: Address,
    pub(crate) verifier_params: VerifierParams,
    pub(crate) bootloader_hash: B256,
    pub(crate) default_account_hash: B256,

    /// Canonical hash of the registered system-upgrade transaction; zero
    /// when none is pending finalization.
    pub(crate) l2_system_upgrade_tx_hash: B256,

    /// Batch number the pending upgrade transaction was included in; zero
    /// until inclusion and after finalization.
    pub(crate) l2_system_upgrade_batch_number: u64,

    pub(crate) priority_queue: PriorityQueue,
    pub(crate) events: Vec<ProtocolEvent>,
}

impl ChainState {
    /// Creates the genesis state.
    pub fn genesis(
        protocol_version: ProtocolVersion,
        verifier: Address,
        verifier_params: VerifierParams,
        bootloader_hash: B256,
        default_account_hash: B256,
    ) -> Self {
        Self {
            protocol_version,
            verifier,
            verifier_params,
            bootloader_hash,
            default_account_hash,
            l2_system_upgrade_tx_hash: B256::ZERO,
            l2_system_upgrade_batch_number: 0,
            priority_queue: PriorityQueue::new(),
            events: Vec::new(),
        }
    }

    pub fn protocol_version(&self) -> ProtocolVersion {
        self.protocol_version
    }

    pub fn verifier(&self) -> Address {
        self.verifier
    }

    pub fn verifier_params(&self) -> &VerifierParams {
        &self.verifier_params
    }

    pub fn bootloader_hash(&self) -> B256 {
        self.bootloader_hash
    }

    pub fn default_account_hash(&self) -> B256 {
        self.default_account_hash
    }

    pub fn l2_system_upgrade_tx_hash(&self) -> B256 {
        self.l2_system_upgrade_tx_hash
    }

    pub fn l2_system_upgrade_batch_number(&self) -> u64 {
        self.l2_system_upgrade_batch_number
    }

    pub fn priority_queue(&self) -> &PriorityQueue {
        &self.priority_queue
    }

    pub fn priority_queue_mut(&mut self) -> &mut PriorityQueue {
        &mut self.priority_queue
    }

    pub fn events(&self) -> &[ProtocolEvent] {
        &self.events
    }

    /// Accepts a user-submitted priority transaction: computes its canonical
    /// hash, appends it to the queue and records the request event.
    pub fn request_l2_transaction(
        &mut self,
        tx: &L2CanonicalTransaction,
        expiration_timestamp: u64,
    ) -> Result<B256, StateError> {
        if tx.tx_type != U256::from(PRIORITY_OPERATION_L2_TX_TYPE) {
            return Err(StateError::InvalidPriorityTxType { got: tx.tx_type });
        }

        let tx_hash = tx.canonical_hash();
        let tx_id = self.priority_queue.total();
        self.priority_queue.push_back(PriorityOperation {
            canonical_tx_hash: tx_hash,
            expiration_timestamp,
        });
        self.events.push(ProtocolEvent::NewPriorityRequest {
            tx_id,
            tx_hash,
            expiration_timestamp,
        });
        info!(%tx_hash, tx_id, "queued priority transaction");
        Ok(tx_hash)
    }

    /// Records the batch in which the pending upgrade transaction was
    /// included.  A later non-patch upgrade is blocked until
    /// [`Self::finalize_upgrade`] clears this again.
    pub fn mark_upgrade_tx_included(&mut self, batch_number: u64) -> Result<(), StateError> {
        if self.l2_system_upgrade_tx_hash.is_zero() {
            return Err(StateError::NoPendingUpgradeTx);
        }
        if batch_number == 0 {
            return Err(StateError::BatchNumberZero);
        }
        if self.l2_system_upgrade_batch_number != 0 {
            return Err(StateError::UpgradeTxAlreadyIncluded(
                self.l2_system_upgrade_batch_number,
            ));
        }
        self.l2_system_upgrade_batch_number = batch_number;
        Ok(())
    }

    /// Clears the pending upgrade-transaction marker once its L2 effects
    /// are proven and executed, unblocking the next minor upgrade.
    pub fn finalize_upgrade(&mut self) -> Result<(), StateError> {
        if self.l2_system_upgrade_tx_hash.is_zero() {
            return Err(StateError::NoPendingUpgradeTx);
        }
        info!(
            tx_hash = %self.l2_system_upgrade_tx_hash,
            batch = self.l2_system_upgrade_batch_number,
            "finalized system upgrade transaction"
        );
        self.l2_system_upgrade_tx_hash = B256::ZERO;
        self.l2_system_upgrade_batch_number = 0;
        Ok(())
    }
}
