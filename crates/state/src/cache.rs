//! Copy-on-commit state cache.
//!
//! Multi-step operations (the upgrade state machine, upgrade hooks) write
//! into a scratch copy of the chain state.  On success the caller commits
//! the copy back; on error the cache is simply dropped and the committed
//! state never observes any of the writes.

use alloy_primitives::{Address, B256};
use cairn_primitives::ProtocolVersion;
use cairn_upgrade_types::VerifierParams;
use tracing::debug;

use crate::{ChainState, ProtocolEvent};

/// Scratch copy of a [`ChainState`] with event-emitting mutators.
#[derive(Debug)]
pub struct StateCache {
    new: ChainState,
}

impl StateCache {
    /// Starts a cache over a snapshot of the given state.
    pub fn new(state: &ChainState) -> Self {
        Self { new: state.clone() }
    }

    /// Read view of the pending state, including uncommitted writes.
    pub fn state(&self) -> &ChainState {
        &self.new
    }

    /// Consumes the cache, yielding the state to commit.
    pub fn commit(self) -> ChainState {
        self.new
    }

    /// Appends a bare event to the log.
    pub fn push_event(&mut self, event: ProtocolEvent) {
        self.new.events.push(event);
    }

    pub fn set_protocol_version(&mut self, new: ProtocolVersion) {
        let old = self.new.protocol_version;
        debug!(%old, %new, "protocol version change staged");
        self.new.protocol_version = new;
        self.push_event(ProtocolEvent::NewProtocolVersion { old, new });
    }

    pub fn set_bootloader_hash(&mut self, new: B256) {
        let old = self.new.bootloader_hash;
        self.new.bootloader_hash = new;
        self.push_event(ProtocolEvent::NewL2BootloaderBytecodeHash { old, new });
    }

    pub fn set_default_account_hash(&mut self, new: B256) {
        let old = self.new.default_account_hash;
        self.new.default_account_hash = new;
        self.push_event(ProtocolEvent::NewL2DefaultAccountBytecodeHash { old, new });
    }

    pub fn set_verifier(&mut self, new: Address) {
        let old = self.new.verifier;
        self.new.verifier = new;
        self.push_event(ProtocolEvent::NewVerifier { old, new });
    }

    pub fn set_verifier_params(&mut self, new: VerifierParams) {
        let old = self.new.verifier_params;
        self.new.verifier_params = new;
        self.push_event(ProtocolEvent::NewVerifierParams { old, new });
    }

    /// Stages the pending upgrade-transaction marker.
    pub fn set_pending_upgrade_tx_hash(&mut self, hash: B256) {
        self.new.l2_system_upgrade_tx_hash = hash;
    }
}
