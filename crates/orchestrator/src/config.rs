//! Ecosystem configuration, read once at orchestration start.

use alloy_primitives::{Address, B256};
use cairn_diamond::FacetCut;
use cairn_primitives::{
    constants::{MAX_GAS_PER_PUBDATA_BYTE, PRIORITY_TX_MAX_GAS_LIMIT},
    ProtocolSemVer, ProtocolVersion,
};
use cairn_upgrade_types::VerifierParams;
use serde::{Deserialize, Serialize};

/// Default cooling-off window between the two rollout stages, in seconds.
const DEFAULT_TIMER_DELAY: u64 = 3 * 24 * 60 * 60;

/// Everything the orchestrator needs to assemble an upgrade rollout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcosystemConfig {
    pub chain_id: u64,

    /// Address issuing both governance call batches.
    pub governance: Address,

    /// Current owner of the target contracts, handing them over to
    /// governance in stage 1.
    pub deployer: Address,

    /// Contracts whose ownership stage 1 accepts, in acceptance order.
    #[serde(default)]
    pub ownership_targets: Vec<Address>,

    pub contracts: ContractsConfig,
    pub implementations: ImplementationsConfig,

    #[serde(default)]
    pub verifier: VerifierConfig,

    #[serde(default)]
    pub fees: FeeConfig,

    #[serde(default)]
    pub tokens: TokenConfig,

    pub upgrade: UpgradeConfig,
}

impl EcosystemConfig {
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// The packed version this rollout upgrades to.
    pub fn new_protocol_version(&self) -> ProtocolVersion {
        self.upgrade.version.pack()
    }
}

/// Proxy addresses of the deployed ecosystem contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    pub state_transition_manager: Address,
    pub bridgehub: Address,
    pub shared_bridge: Address,
    pub legacy_erc20_bridge: Address,
    pub native_token_vault: Address,
    pub validator_timelock: Address,
}

/// Freshly deployed implementation addresses the stage-2 swaps install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationsConfig {
    pub state_transition_manager: Address,
    pub bridgehub: Address,
    pub shared_bridge: Address,
    pub legacy_erc20_bridge: Address,
}

/// Verifier reference and recursion verification-key hashes.  Zero values
/// keep whatever the chain currently has.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifierConfig {
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub recursion_node_level_vk_hash: B256,
    #[serde(default)]
    pub recursion_leaf_level_vk_hash: B256,
    #[serde(default)]
    pub recursion_circuits_set_vks_hash: B256,
}

impl VerifierConfig {
    pub fn params(&self) -> VerifierParams {
        VerifierParams {
            recursion_node_level_vk_hash: self.recursion_node_level_vk_hash,
            recursion_leaf_level_vk_hash: self.recursion_leaf_level_vk_hash,
            recursion_circuits_set_vks_hash: self.recursion_circuits_set_vks_hash,
        }
    }
}

/// Gas and pubdata bounds applied to upgrade transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    #[serde(default = "default_priority_tx_max_gas_limit")]
    pub priority_tx_max_gas_limit: u64,
    #[serde(default = "default_max_gas_per_pubdata")]
    pub max_gas_per_pubdata: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            priority_tx_max_gas_limit: PRIORITY_TX_MAX_GAS_LIMIT,
            max_gas_per_pubdata: MAX_GAS_PER_PUBDATA_BYTE,
        }
    }
}

fn default_priority_tx_max_gas_limit() -> u64 {
    PRIORITY_TX_MAX_GAS_LIMIT
}

fn default_max_gas_per_pubdata() -> u64 {
    MAX_GAS_PER_PUBDATA_BYTE
}

/// Token addresses the rewired vault references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenConfig {
    #[serde(default)]
    pub base_token: Address,
}

/// Parameters of the upgrade this rollout publishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeConfig {
    /// The version the rollout registers and upgrades to.
    pub version: ProtocolSemVer,

    /// Facet cuts registered as the version's creation parameters.
    #[serde(default)]
    pub facet_cuts: Vec<FacetCut>,

    /// Cooling-off window between stage 1 and stage 2, in seconds.
    #[serde(default = "default_timer_delay")]
    pub timer_delay: u64,

    /// Earliest execution time of the chain upgrade itself.
    #[serde(default)]
    pub upgrade_timestamp: u64,
}

fn default_timer_delay() -> u64 {
    DEFAULT_TIMER_DELAY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml() {
        let raw = r#"
            chain_id = 324
            governance = "0x1111111111111111111111111111111111111111"
            deployer = "0x2222222222222222222222222222222222222222"
            ownership_targets = [
                "0x3333333333333333333333333333333333333333",
                "0x4444444444444444444444444444444444444444",
            ]

            [contracts]
            state_transition_manager = "0x3333333333333333333333333333333333333333"
            bridgehub = "0x4444444444444444444444444444444444444444"
            shared_bridge = "0x5555555555555555555555555555555555555555"
            legacy_erc20_bridge = "0x6666666666666666666666666666666666666666"
            native_token_vault = "0x7777777777777777777777777777777777777777"
            validator_timelock = "0x8888888888888888888888888888888888888888"

            [implementations]
            state_transition_manager = "0x9999999999999999999999999999999999999999"
            bridgehub = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
            shared_bridge = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb"
            legacy_erc20_bridge = "0xcccccccccccccccccccccccccccccccccccccccc"

            [upgrade]
            version = { major = 0, minor = 26, patch = 0 }

            [[upgrade.facet_cuts]]
            facet = "0xdddddddddddddddddddddddddddddddddddddddd"
            action = "Add"
            is_freezable = true
            selectors = ["0xdeadbeef"]
        "#;

        let config = EcosystemConfig::from_toml(raw).unwrap();
        assert_eq!(config.chain_id, 324);
        assert_eq!(config.ownership_targets.len(), 2);
        assert_eq!(
            config.new_protocol_version(),
            ProtocolSemVer::new(0, 26, 0).pack()
        );
        assert_eq!(config.upgrade.facet_cuts.len(), 1);

        // Omitted sections fall back to their defaults.
        assert_eq!(
            config.fees.priority_tx_max_gas_limit,
            PRIORITY_TX_MAX_GAS_LIMIT
        );
        assert_eq!(config.upgrade.timer_delay, DEFAULT_TIMER_DELAY);
        assert!(config.verifier.address.is_zero());
        assert!(config.verifier.params().is_zero());
    }
}
