//! Builders for the two ordered rollout call-batches.
//!
//! Stage 1 is pure bookkeeping and safe to abandon; stage 2 performs the
//! irreversible implementation swaps and is gated on the cooling-off timer
//! stage 1 started.

use crate::{CallBatch, EcosystemConfig, GovernanceCall};

/// Builds the stage-1 batch: ownership acceptance for every target, then
/// version registration, timelock rewiring, a freeze on new-chain creation
/// and the timer start.
pub fn build_stage1(config: &EcosystemConfig) -> CallBatch {
    let mut batch = CallBatch::new();
    for target in &config.ownership_targets {
        batch.push(GovernanceCall::AcceptOwnership { target: *target });
    }
    batch.push(GovernanceCall::RegisterVersion {
        version: config.new_protocol_version(),
        facet_cuts: config.upgrade.facet_cuts.clone(),
    });
    batch.push(GovernanceCall::SetValidatorTimelock {
        timelock: config.contracts.validator_timelock,
    });
    batch.push(GovernanceCall::DisableChainCreation);
    batch.push(GovernanceCall::StartTimer {
        delay: config.upgrade.timer_delay,
    });
    batch
}

/// Builds the stage-2 batch: implementation swaps in dependency order,
/// vault rewiring, old-version invalidation, and the timer gate.
///
/// The swap order is load-bearing: the bridgehub reads addresses the
/// manager swap installs, and the bridges read addresses the bridgehub
/// swap installs.
pub fn build_stage2(config: &EcosystemConfig) -> CallBatch {
    let mut batch = CallBatch::new();
    batch.push(GovernanceCall::SwapImplementation {
        proxy: config.contracts.state_transition_manager,
        implementation: config.implementations.state_transition_manager,
    });
    batch.push(GovernanceCall::SwapImplementation {
        proxy: config.contracts.bridgehub,
        implementation: config.implementations.bridgehub,
    });
    batch.push(GovernanceCall::SwapImplementation {
        proxy: config.contracts.shared_bridge,
        implementation: config.implementations.shared_bridge,
    });
    batch.push(GovernanceCall::SwapImplementation {
        proxy: config.contracts.legacy_erc20_bridge,
        implementation: config.implementations.legacy_erc20_bridge,
    });
    batch.push(GovernanceCall::RewireTokenVault {
        vault: config.contracts.native_token_vault,
        base_token: config.tokens.base_token,
    });
    batch.push(GovernanceCall::LiftOldVersionDeadline);
    batch.push(GovernanceCall::AssertTimerElapsed);
    batch
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use cairn_primitives::ProtocolSemVer;

    use super::*;
    use crate::{ContractsConfig, ImplementationsConfig, UpgradeConfig};

    fn addr(n: u8) -> Address {
        Address::repeat_byte(n)
    }

    fn config() -> EcosystemConfig {
        EcosystemConfig {
            chain_id: 324,
            governance: addr(0x01),
            deployer: addr(0x02),
            ownership_targets: vec![addr(0x10), addr(0x11), addr(0x12)],
            contracts: ContractsConfig {
                state_transition_manager: addr(0x10),
                bridgehub: addr(0x11),
                shared_bridge: addr(0x12),
                legacy_erc20_bridge: addr(0x13),
                native_token_vault: addr(0x14),
                validator_timelock: addr(0x15),
            },
            implementations: ImplementationsConfig {
                state_transition_manager: addr(0x20),
                bridgehub: addr(0x21),
                shared_bridge: addr(0x22),
                legacy_erc20_bridge: addr(0x23),
            },
            verifier: Default::default(),
            fees: Default::default(),
            tokens: Default::default(),
            upgrade: UpgradeConfig {
                version: ProtocolSemVer::new(0, 26, 0),
                facet_cuts: Vec::new(),
                timer_delay: 100,
                upgrade_timestamp: 0,
            },
        }
    }

    #[test]
    fn stage1_order() {
        let config = config();
        let batch = build_stage1(&config);

        // Ownership acceptance comes first, one call per target, in the
        // configured order.
        for (call, target) in batch.iter().zip(&config.ownership_targets) {
            assert_eq!(call, &GovernanceCall::AcceptOwnership { target: *target });
        }

        let tail: Vec<_> = batch.iter().skip(config.ownership_targets.len()).collect();
        assert!(matches!(tail[0], GovernanceCall::RegisterVersion { .. }));
        assert!(matches!(tail[1], GovernanceCall::SetValidatorTimelock { .. }));
        assert_eq!(tail[2], &GovernanceCall::DisableChainCreation);
        assert_eq!(tail[3], &GovernanceCall::StartTimer { delay: 100 });
        assert_eq!(tail.len(), 4);
    }

    #[test]
    fn stage2_swaps_manager_before_bridgehub_before_bridges() {
        let config = config();
        let batch = build_stage2(&config);

        let swap_proxies: Vec<_> = batch
            .iter()
            .filter_map(|call| match call {
                GovernanceCall::SwapImplementation { proxy, .. } => Some(*proxy),
                _ => None,
            })
            .collect();
        assert_eq!(
            swap_proxies,
            vec![addr(0x10), addr(0x11), addr(0x12), addr(0x13)]
        );

        // The timer gate closes the batch.
        assert_eq!(batch.calls().last(), Some(&GovernanceCall::AssertTimerElapsed));
        assert!(matches!(
            batch.calls()[batch.len() - 2],
            GovernanceCall::LiftOldVersionDeadline
        ));
    }
}
