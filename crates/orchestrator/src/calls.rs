//! The governance call vocabulary and ordered batches of it.

use alloy_primitives::Address;
use cairn_diamond::FacetCut;
use cairn_primitives::ProtocolVersion;
use serde::{Deserialize, Serialize};

/// One governance action, as executed by [`crate::Ecosystem::execute_batch`]
/// and serialized into the output artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum GovernanceCall {
    /// Completes a two-step ownership handover of a target contract.
    AcceptOwnership { target: Address },

    /// Registers the new protocol version together with the facet cuts
    /// chains created or upgraded under it will use.
    RegisterVersion {
        version: ProtocolVersion,
        facet_cuts: Vec<FacetCut>,
    },

    /// Points batch commitment at a (new) validator timelock.
    SetValidatorTimelock { timelock: Address },

    /// Blocks creation of new chains for the duration of the rollout.
    DisableChainCreation,

    /// Starts the cooling-off timer gating stage 2.
    StartTimer { delay: u64 },

    /// Swaps a proxy's implementation.  Irreversible once committed.
    SwapImplementation {
        proxy: Address,
        implementation: Address,
    },

    /// Re-points cross-contract references at the native token vault and
    /// the base token it accounts in.
    RewireTokenVault {
        vault: Address,
        base_token: Address,
    },

    /// Drops the old protocol version's deprecation deadline to zero,
    /// finally invalidating it.
    LiftOldVersionDeadline,

    /// Hard gate: fails the batch unless the cooling-off deadline passed.
    AssertTimerElapsed,
}

/// An ordered batch of governance calls, executed transactionally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallBatch {
    calls: Vec<GovernanceCall>,
}

impl CallBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, call: GovernanceCall) {
        self.calls.push(call);
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn calls(&self) -> &[GovernanceCall] {
        &self.calls
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GovernanceCall> {
        self.calls.iter()
    }
}

impl<'a> IntoIterator for &'a CallBatch {
    type Item = &'a GovernanceCall;
    type IntoIter = std::slice::Iter<'a, GovernanceCall>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.iter()
    }
}
