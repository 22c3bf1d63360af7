//! The output artifact handed to downstream governance tooling.

use std::collections::BTreeMap;

use alloy_primitives::Address;
use cairn_diamond::FacetCut;
use cairn_primitives::ProtocolVersion;
use serde::{Deserialize, Serialize};

use crate::{build_stage1, build_stage2, CallBatch, EcosystemConfig};

/// A complete, serializable record of one prepared rollout: every deployed
/// address, the facet-cut payload, and both ordered call batches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeArtifact {
    pub chain_id: u64,
    pub new_protocol_version: ProtocolVersion,
    pub deployed_addresses: BTreeMap<String, Address>,
    pub facet_cuts: Vec<FacetCut>,
    pub stage1: CallBatch,
    pub stage2: CallBatch,
}

impl UpgradeArtifact {
    /// Assembles the artifact for a configured rollout.
    pub fn build(config: &EcosystemConfig) -> Self {
        let mut deployed_addresses = BTreeMap::new();
        deployed_addresses.insert(
            "state_transition_manager_implementation".to_owned(),
            config.implementations.state_transition_manager,
        );
        deployed_addresses.insert(
            "bridgehub_implementation".to_owned(),
            config.implementations.bridgehub,
        );
        deployed_addresses.insert(
            "shared_bridge_implementation".to_owned(),
            config.implementations.shared_bridge,
        );
        deployed_addresses.insert(
            "legacy_erc20_bridge_implementation".to_owned(),
            config.implementations.legacy_erc20_bridge,
        );
        deployed_addresses.insert(
            "validator_timelock".to_owned(),
            config.contracts.validator_timelock,
        );
        deployed_addresses.insert(
            "native_token_vault".to_owned(),
            config.contracts.native_token_vault,
        );
        deployed_addresses.insert("verifier".to_owned(), config.verifier.address);

        Self {
            chain_id: config.chain_id,
            new_protocol_version: config.new_protocol_version(),
            deployed_addresses,
            facet_cuts: config.upgrade.facet_cuts.clone(),
            stage1: build_stage1(config),
            stage2: build_stage2(config),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
