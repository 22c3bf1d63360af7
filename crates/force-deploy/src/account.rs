//! Execution-layer account records and deployment events.

use alloy_primitives::{Address, Bytes, B256, U256};
use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

/// Account-abstraction support level of a deployed contract.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Arbitrary, Serialize, Deserialize)]
pub enum AccountVersion {
    /// Plain contract, not usable as a transaction initiator.
    #[default]
    None,
    /// First-generation abstract account.
    Version1,
}

/// How an account's nonces must be consumed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Arbitrary, Serialize, Deserialize)]
pub enum AccountNonceOrdering {
    /// Nonces are consumed strictly in order.
    #[default]
    Sequential,
    /// Free-form nonce usage.  Deprecated; no account may switch to it.
    Arbitrary,
}

/// Per-address execution-layer record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Versioned hash of the deployed code; zero for an empty account.
    pub code_hash: B256,
    pub nonce: u64,
    pub balance: U256,
    pub aa_version: AccountVersion,
    pub nonce_ordering: AccountNonceOrdering,
}

/// Audit-trail events of the execution layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeployEvent {
    /// A factory dependency became available to the execution layer.
    BytecodePublished { bytecode_hash: B256 },

    /// Code was placed at an address.
    ContractDeployed {
        deployer: Address,
        bytecode_hash: B256,
        address: Address,
    },

    /// A force deployment ran its constructor.
    ConstructorExecuted {
        address: Address,
        value: U256,
        input: Bytes,
    },

    /// An account changed its abstraction version.
    AccountVersionUpdated {
        address: Address,
        version: AccountVersion,
    },

    /// An account changed its nonce-ordering discipline.
    NonceOrderingUpdated {
        address: Address,
        ordering: AccountNonceOrdering,
    },
}
