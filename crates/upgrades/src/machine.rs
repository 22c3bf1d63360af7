//! The upgrade execution sequence.

use alloy_primitives::{B256, U256};
use cairn_primitives::{
    constants::{
        MAX_ALLOWED_MINOR_VERSION_DELTA, MAX_NEW_FACTORY_DEPS, PRIORITY_TX_MAX_GAS_LIMIT,
        SYSTEM_UPGRADE_L2_TX_TYPE,
    },
    hash_bytecode, ProtocolVersion,
};
use cairn_state::{ChainState, ProtocolEvent, StateCache};
use cairn_upgrade_types::ProposedUpgrade;
use tracing::info;

use crate::{validator, UpgradeError, UpgradeHandler};

/// Environment the upgrade executes under.
#[derive(Copy, Clone, Debug)]
pub struct UpgradeContext {
    /// Current time, unix seconds.
    pub now: u64,
    /// Bound on the minor-version jump of a single upgrade.
    pub max_minor_version_delta: u32,
    /// Gas ceiling applied to the upgrade transaction.
    pub priority_tx_max_gas_limit: u64,
}

impl UpgradeContext {
    /// Context with the protocol's configured bounds.
    pub fn new(now: u64) -> Self {
        Self {
            now,
            max_minor_version_delta: MAX_ALLOWED_MINOR_VERSION_DELTA,
            priority_tx_max_gas_limit: PRIORITY_TX_MAX_GAS_LIMIT,
        }
    }
}

/// Transactional entry point: executes the proposal against the state,
/// committing only if every step succeeds.
pub fn upgrade(
    state: &mut ChainState,
    proposal: &ProposedUpgrade,
    ctx: &UpgradeContext,
    handler: &mut dyn UpgradeHandler,
) -> Result<B256, UpgradeError> {
    let mut cache = StateCache::new(state);
    let tx_hash = execute_upgrade(&mut cache, proposal, ctx, handler)?;
    *state = cache.commit();
    Ok(tx_hash)
}

/// Plays out an upgrade proposal against a state cache.
///
/// Callers own atomicity: commit the cache on success, drop it on error.
/// Returns the canonical hash of the registered upgrade transaction, or
/// zero if the proposal carried the noop sentinel.
pub fn execute_upgrade(
    cache: &mut StateCache,
    proposal: &ProposedUpgrade,
    ctx: &UpgradeContext,
    handler: &mut dyn UpgradeHandler,
) -> Result<B256, UpgradeError> {
    if ctx.now < proposal.upgrade_timestamp {
        return Err(UpgradeError::TimeNotReached {
            scheduled: proposal.upgrade_timestamp,
            now: ctx.now,
        });
    }

    let patch_only = set_new_protocol_version(cache, proposal.new_protocol_version, ctx)?;

    handler.upgrade_l1_contracts(cache, &proposal.l1_contracts_upgrade_calldata)?;

    upgrade_verifier(cache, proposal);
    set_base_system_contracts(cache, proposal, patch_only)?;
    let tx_hash = set_l2_system_contract_upgrade(cache, proposal, ctx, patch_only)?;

    handler.post_upgrade(cache, &proposal.post_upgrade_calldata)?;

    cache.push_event(ProtocolEvent::UpgradeComplete {
        new_version: proposal.new_protocol_version,
        tx_hash,
        proposal: Box::new(proposal.clone()),
    });
    info!(
        version = %proposal.new_protocol_version,
        %tx_hash,
        patch_only,
        "protocol upgrade executed"
    );
    Ok(tx_hash)
}

/// Validates and commits the version transition.  Returns whether the
/// upgrade is patch-only.
fn set_new_protocol_version(
    cache: &mut StateCache,
    new: ProtocolVersion,
    ctx: &UpgradeContext,
) -> Result<bool, UpgradeError> {
    let current = cache.state().protocol_version();
    if new <= current {
        return Err(UpgradeError::ProtocolVersionTooSmall {
            proposed: new,
            current,
        });
    }
    if current.major() != 0 {
        return Err(UpgradeError::ProtocolMajorVersionNotZero(current));
    }
    if new.major() != 0 {
        return Err(UpgradeError::ProtocolMajorVersionNotZero(new));
    }

    // `new > current` with equal majors implies the minor does not shrink.
    let minor_delta = new.minor() - current.minor();
    let patch_only = minor_delta == 0;
    if minor_delta > ctx.max_minor_version_delta {
        return Err(UpgradeError::ProtocolVersionMinorDeltaTooBig {
            delta: minor_delta,
            max: ctx.max_minor_version_delta,
        });
    }

    // A minor upgrade must not silently skip over an upgrade transaction
    // whose L2 effects were never observed as committed.
    if !patch_only {
        let pending = cache.state().l2_system_upgrade_tx_hash();
        if !pending.is_zero() {
            return Err(UpgradeError::PreviousUpgradeNotFinalized(pending));
        }
        let batch = cache.state().l2_system_upgrade_batch_number();
        if batch != 0 {
            return Err(UpgradeError::PreviousUpgradeNotCleaned(batch));
        }
    }

    cache.set_protocol_version(new);
    Ok(patch_only)
}

/// Replaces the verifier reference and recursion parameters; zero means
/// "leave unchanged".
fn upgrade_verifier(cache: &mut StateCache, proposal: &ProposedUpgrade) {
    if !proposal.verifier_params.is_zero() {
        cache.set_verifier_params(proposal.verifier_params);
    }
    if !proposal.verifier.is_zero() {
        cache.set_verifier(proposal.verifier);
    }
}

/// Sets bootloader/default-account bytecode hashes, each independently
/// skippable via the zero sentinel and categorically forbidden for
/// patch-only upgrades.
fn set_base_system_contracts(
    cache: &mut StateCache,
    proposal: &ProposedUpgrade,
    patch_only: bool,
) -> Result<(), UpgradeError> {
    if !proposal.bootloader_hash.is_zero() {
        if patch_only {
            return Err(UpgradeError::PatchUpgradeCantSetBootloader);
        }
        hash_bytecode_check(proposal.bootloader_hash)?;
        cache.set_bootloader_hash(proposal.bootloader_hash);
    }
    if !proposal.default_account_hash.is_zero() {
        if patch_only {
            return Err(UpgradeError::PatchUpgradeCantSetDefaultAccount);
        }
        hash_bytecode_check(proposal.default_account_hash)?;
        cache.set_default_account_hash(proposal.default_account_hash);
    }
    Ok(())
}

fn hash_bytecode_check(hash: B256) -> Result<(), UpgradeError> {
    cairn_primitives::validate_bytecode_hash(hash)?;
    Ok(())
}

/// Validates and registers the mandatory L2 system-upgrade transaction.
fn set_l2_system_contract_upgrade(
    cache: &mut StateCache,
    proposal: &ProposedUpgrade,
    ctx: &UpgradeContext,
    patch_only: bool,
) -> Result<B256, UpgradeError> {
    let tx = &proposal.l2_protocol_upgrade_tx;

    // The noop sentinel: valid for patch upgrades and upgrades with no L2
    // side effect.
    if tx.is_noop() {
        return Ok(B256::ZERO);
    }
    if tx.tx_type != U256::from(SYSTEM_UPGRADE_L2_TX_TYPE) {
        return Err(UpgradeError::InvalidTxType(tx.tx_type));
    }
    if patch_only {
        return Err(UpgradeError::PatchCantSetUpgradeTxn);
    }

    let new_minor = proposal.new_protocol_version.minor();
    if tx.nonce != U256::from(new_minor) {
        return Err(UpgradeError::L2UpgradeNonceNotEqualToNewProtocolVersion {
            nonce: tx.nonce,
            minor: new_minor,
        });
    }

    validator::validate_l1_to_l2_transaction(tx, ctx.priority_tx_max_gas_limit)?;
    validator::validate_upgrade_transaction(tx)?;
    verify_factory_deps(&proposal.factory_deps, &tx.factory_deps)?;

    let tx_hash = tx.canonical_hash();
    cache.set_pending_upgrade_tx_hash(tx_hash);
    Ok(tx_hash)
}

/// Checks the published preimages against the hashes the transaction
/// commits to.
fn verify_factory_deps(
    preimages: &[alloy_primitives::Bytes],
    expected: &[U256],
) -> Result<(), UpgradeError> {
    if preimages.len() != expected.len() {
        return Err(UpgradeError::UnexpectedNumberOfFactoryDeps {
            expected: expected.len(),
            got: preimages.len(),
        });
    }
    if preimages.len() > MAX_NEW_FACTORY_DEPS {
        return Err(UpgradeError::TxValidation(
            crate::TxValidationError::TooManyFactoryDeps {
                count: preimages.len(),
                max: MAX_NEW_FACTORY_DEPS,
            },
        ));
    }
    for (index, (preimage, expected)) in preimages.iter().zip(expected).enumerate() {
        let actual = hash_bytecode(preimage)?;
        let expected = B256::from(expected.to_be_bytes());
        if actual != expected {
            return Err(UpgradeError::L2BytecodeHashMismatch {
                index,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, Bytes};
    use cairn_primitives::ProtocolSemVer;
    use cairn_test_utils::{genesis_chain_state, proposed_upgrade, ArbitraryGenerator};
    use cairn_upgrade_types::{L2CanonicalTransaction, VerifierParams};

    use super::*;
    use crate::NoopHandler;

    fn ctx() -> UpgradeContext {
        UpgradeContext::new(1_000_000)
    }

    fn version(minor: u32, patch: u32) -> ProtocolVersion {
        ProtocolSemVer::new(0, minor, patch).pack()
    }

    fn try_upgrade(
        state: &mut ChainState,
        proposal: &ProposedUpgrade,
    ) -> Result<B256, UpgradeError> {
        upgrade(state, proposal, &ctx(), &mut NoopHandler)
    }

    #[test]
    fn end_to_end_minor_upgrade() {
        // 0x19_0000_0000 -> 0x1a_0000_0000, minor delta 1.
        let mut state = genesis_chain_state(version(0x19, 0));
        let proposal = proposed_upgrade(version(0x1a, 0));

        let tx_hash = try_upgrade(&mut state, &proposal).unwrap();
        assert_eq!(state.protocol_version(), version(0x1a, 0));
        assert_eq!(tx_hash, proposal.l2_protocol_upgrade_tx.canonical_hash());
        assert_eq!(state.l2_system_upgrade_tx_hash(), tx_hash);

        match state.events().last().unwrap() {
            ProtocolEvent::UpgradeComplete {
                new_version,
                tx_hash: event_hash,
                proposal: event_proposal,
            } => {
                assert_eq!(*new_version, version(0x1a, 0));
                assert_eq!(*event_hash, tx_hash);
                assert_eq!(**event_proposal, proposal);
            }
            other => panic!("unexpected last event {other:?}"),
        }
    }

    #[test]
    fn time_gate() {
        let mut state = genesis_chain_state(version(25, 0));
        let mut proposal = proposed_upgrade(version(26, 0));
        proposal.upgrade_timestamp = ctx().now + 1;

        assert_eq!(
            try_upgrade(&mut state, &proposal),
            Err(UpgradeError::TimeNotReached {
                scheduled: ctx().now + 1,
                now: ctx().now,
            })
        );
        assert_eq!(state.protocol_version(), version(25, 0));
    }

    #[test]
    fn version_must_strictly_grow() {
        let mut state = genesis_chain_state(version(25, 1));

        for proposed in [version(25, 1), version(25, 0), version(24, 9)] {
            let mut proposal = proposed_upgrade(proposed);
            proposal.l2_protocol_upgrade_tx = L2CanonicalTransaction::default();
            let before = state.clone();
            assert!(matches!(
                try_upgrade(&mut state, &proposal),
                Err(UpgradeError::ProtocolVersionTooSmall { .. })
            ));
            assert_eq!(state, before);
        }
    }

    #[test]
    fn major_version_is_pinned_to_zero() {
        let mut state = genesis_chain_state(version(25, 0));
        let mut proposal = proposed_upgrade(ProtocolSemVer::new(1, 0, 0).pack());
        proposal.l2_protocol_upgrade_tx = L2CanonicalTransaction::default();
        assert!(matches!(
            try_upgrade(&mut state, &proposal),
            Err(UpgradeError::ProtocolMajorVersionNotZero(_))
        ));
    }

    #[test]
    fn minor_delta_bound() {
        let mut state = genesis_chain_state(version(25, 0));
        let too_far = version(25 + MAX_ALLOWED_MINOR_VERSION_DELTA + 1, 0);
        let mut proposal = proposed_upgrade(too_far);
        proposal.l2_protocol_upgrade_tx.nonce = U256::from(too_far.minor());

        let before = state.clone();
        assert_eq!(
            try_upgrade(&mut state, &proposal),
            Err(UpgradeError::ProtocolVersionMinorDeltaTooBig {
                delta: MAX_ALLOWED_MINOR_VERSION_DELTA + 1,
                max: MAX_ALLOWED_MINOR_VERSION_DELTA,
            })
        );
        assert_eq!(state, before);

        // The bound itself is allowed.
        let at_bound = version(25 + MAX_ALLOWED_MINOR_VERSION_DELTA, 0);
        let proposal = proposed_upgrade(at_bound);
        try_upgrade(&mut state, &proposal).unwrap();
        assert_eq!(state.protocol_version(), at_bound);
    }

    #[test]
    fn patch_only_restrictions() {
        let base = genesis_chain_state(version(25, 0));
        let patch = version(25, 1);

        let mut proposal = proposed_upgrade(patch);
        proposal.l2_protocol_upgrade_tx = L2CanonicalTransaction::default();
        proposal.factory_deps.clear();
        proposal.bootloader_hash = cairn_primitives::hash_bytecode(&[7u8; 32]).unwrap();
        let mut state = base.clone();
        assert_eq!(
            try_upgrade(&mut state, &proposal),
            Err(UpgradeError::PatchUpgradeCantSetBootloader)
        );

        let mut proposal = proposed_upgrade(patch);
        proposal.l2_protocol_upgrade_tx = L2CanonicalTransaction::default();
        proposal.factory_deps.clear();
        proposal.default_account_hash = cairn_primitives::hash_bytecode(&[8u8; 32]).unwrap();
        let mut state = base.clone();
        assert_eq!(
            try_upgrade(&mut state, &proposal),
            Err(UpgradeError::PatchUpgradeCantSetDefaultAccount)
        );

        // A real upgrade tx in a patch proposal is rejected.
        let proposal = proposed_upgrade(patch);
        let mut state = base.clone();
        assert_eq!(
            try_upgrade(&mut state, &proposal),
            Err(UpgradeError::PatchCantSetUpgradeTxn)
        );

        // All-sentinel patch upgrade goes through and touches nothing else.
        let mut proposal = proposed_upgrade(patch);
        proposal.l2_protocol_upgrade_tx = L2CanonicalTransaction::default();
        proposal.factory_deps.clear();
        let mut state = base.clone();
        let tx_hash = try_upgrade(&mut state, &proposal).unwrap();
        assert_eq!(tx_hash, B256::ZERO);
        assert_eq!(state.protocol_version(), patch);
        assert!(state.bootloader_hash().is_zero());
        assert!(state.l2_system_upgrade_tx_hash().is_zero());
    }

    #[test]
    fn upgrade_tx_nonce_must_match_minor() {
        let mut state = genesis_chain_state(version(25, 0));
        let mut proposal = proposed_upgrade(version(26, 0));
        proposal.l2_protocol_upgrade_tx.nonce = U256::from(27u64);

        assert_eq!(
            try_upgrade(&mut state, &proposal),
            Err(UpgradeError::L2UpgradeNonceNotEqualToNewProtocolVersion {
                nonce: U256::from(27u64),
                minor: 26,
            })
        );
    }

    #[test]
    fn wrong_tx_type_rejected() {
        let mut state = genesis_chain_state(version(25, 0));
        let mut proposal = proposed_upgrade(version(26, 0));
        proposal.l2_protocol_upgrade_tx.tx_type = U256::from(255u64);
        assert_eq!(
            try_upgrade(&mut state, &proposal),
            Err(UpgradeError::InvalidTxType(U256::from(255u64)))
        );
    }

    #[test]
    fn pending_upgrade_blocks_minor_but_not_patch() {
        let mut state = genesis_chain_state(version(25, 0));
        let first = proposed_upgrade(version(26, 0));
        let pending = try_upgrade(&mut state, &first).unwrap();

        // Next minor upgrade is blocked.
        let second = proposed_upgrade(version(27, 0));
        assert_eq!(
            try_upgrade(&mut state, &second),
            Err(UpgradeError::PreviousUpgradeNotFinalized(pending))
        );

        // A patch on top is fine.
        let mut patch = proposed_upgrade(version(26, 1));
        patch.l2_protocol_upgrade_tx = L2CanonicalTransaction::default();
        patch.factory_deps.clear();
        try_upgrade(&mut state, &patch).unwrap();

        // Inclusion alone is not enough; the batch marker must clear too.
        state.mark_upgrade_tx_included(5).unwrap();
        state.finalize_upgrade().unwrap();
        try_upgrade(&mut state, &second).unwrap();
        assert_eq!(state.protocol_version(), version(27, 0));
    }

    #[test]
    fn uncleaned_batch_marker_blocks_minor_upgrade() {
        let mut state = genesis_chain_state(version(25, 0));
        let first = proposed_upgrade(version(26, 0));
        try_upgrade(&mut state, &first).unwrap();
        state.mark_upgrade_tx_included(5).unwrap();

        // Simulate a finalization that cleared the hash but not the batch
        // marker; the machine must still refuse.
        let mut cache = StateCache::new(&state);
        cache.set_pending_upgrade_tx_hash(B256::ZERO);
        state = cache.commit();

        let second = proposed_upgrade(version(27, 0));
        assert_eq!(
            try_upgrade(&mut state, &second),
            Err(UpgradeError::PreviousUpgradeNotCleaned(5))
        );
    }

    #[test]
    fn factory_dep_preimages_must_match() {
        let mut state = genesis_chain_state(version(25, 0));

        // Count mismatch.
        let mut proposal = proposed_upgrade(version(26, 0));
        proposal.factory_deps.push(Bytes::from(vec![1u8; 32]));
        assert!(matches!(
            try_upgrade(&mut state, &proposal),
            Err(UpgradeError::UnexpectedNumberOfFactoryDeps { .. })
        ));

        // Hash mismatch.
        let mut proposal = proposed_upgrade(version(26, 0));
        let dep = Bytes::from(vec![1u8; 32]);
        let wrong = hash_bytecode(&[2u8; 32]).unwrap();
        proposal.factory_deps = vec![dep];
        proposal.l2_protocol_upgrade_tx.factory_deps =
            vec![U256::from_be_bytes(wrong.0)];
        assert!(matches!(
            try_upgrade(&mut state, &proposal),
            Err(UpgradeError::L2BytecodeHashMismatch { index: 0, .. })
        ));

        // Matching preimage goes through.
        let mut proposal = proposed_upgrade(version(26, 0));
        let dep = Bytes::from(vec![1u8; 32]);
        let dep_hash = hash_bytecode(&dep).unwrap();
        proposal.factory_deps = vec![dep];
        proposal.l2_protocol_upgrade_tx.factory_deps =
            vec![U256::from_be_bytes(dep_hash.0)];
        try_upgrade(&mut state, &proposal).unwrap();
    }

    #[test]
    fn verifier_zero_sentinels_leave_config_unchanged() {
        let mut state = genesis_chain_state(version(25, 0));
        let verifier = Address::repeat_byte(0xaa);
        let params = VerifierParams {
            recursion_node_level_vk_hash: B256::repeat_byte(1),
            recursion_leaf_level_vk_hash: B256::repeat_byte(2),
            recursion_circuits_set_vks_hash: B256::repeat_byte(3),
        };

        let mut proposal = proposed_upgrade(version(26, 0));
        proposal.verifier = verifier;
        proposal.verifier_params = params;
        try_upgrade(&mut state, &proposal).unwrap();
        assert_eq!(state.verifier(), verifier);
        assert_eq!(state.verifier_params(), &params);
        state.mark_upgrade_tx_included(1).unwrap();
        state.finalize_upgrade().unwrap();

        // Zero sentinels keep the configured values.
        let proposal = proposed_upgrade(version(27, 0));
        try_upgrade(&mut state, &proposal).unwrap();
        assert_eq!(state.verifier(), verifier);
        assert_eq!(state.verifier_params(), &params);
    }

    #[test]
    fn hook_failure_rolls_back_everything() {
        struct FailingHandler;
        impl UpgradeHandler for FailingHandler {
            fn post_upgrade(
                &mut self,
                _cache: &mut StateCache,
                _calldata: &[u8],
            ) -> Result<(), UpgradeError> {
                Err(UpgradeError::HookFailed("gateway dance tripped".into()))
            }
        }

        let mut state = genesis_chain_state(version(25, 0));
        let before = state.clone();
        let proposal = proposed_upgrade(version(26, 0));
        assert!(matches!(
            upgrade(&mut state, &proposal, &ctx(), &mut FailingHandler),
            Err(UpgradeError::HookFailed(_))
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn arbitrary_proposals_commit_fully_or_not_at_all() {
        let mut gen = ArbitraryGenerator::new();
        for _ in 0..32 {
            let proposal: ProposedUpgrade = gen.generate();
            let mut state = genesis_chain_state(version(25, 0));
            let before = state.clone();
            match try_upgrade(&mut state, &proposal) {
                Ok(_) => {
                    assert_eq!(state.protocol_version(), proposal.new_protocol_version)
                }
                Err(_) => assert_eq!(state, before),
            }
        }
    }

    #[test]
    fn hooks_receive_proposal_calldata() {
        #[derive(Default)]
        struct Recorder {
            l1: Vec<u8>,
            post: Vec<u8>,
        }
        impl UpgradeHandler for Recorder {
            fn upgrade_l1_contracts(
                &mut self,
                _cache: &mut StateCache,
                calldata: &[u8],
            ) -> Result<(), UpgradeError> {
                self.l1 = calldata.to_vec();
                Ok(())
            }
            fn post_upgrade(
                &mut self,
                _cache: &mut StateCache,
                calldata: &[u8],
            ) -> Result<(), UpgradeError> {
                self.post = calldata.to_vec();
                Ok(())
            }
        }

        let mut state = genesis_chain_state(version(25, 0));
        let mut proposal = proposed_upgrade(version(26, 0));
        proposal.l1_contracts_upgrade_calldata = Bytes::from(vec![1, 2]);
        proposal.post_upgrade_calldata = Bytes::from(vec![3, 4]);

        let mut recorder = Recorder::default();
        upgrade(&mut state, &proposal, &ctx(), &mut recorder).unwrap();
        assert_eq!(recorder.l1, vec![1, 2]);
        assert_eq!(recorder.post, vec![3, 4]);
    }
}
