//! The execution-layer account store and deterministic deployment.

use std::collections::BTreeMap;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use arbitrary::Arbitrary;
use cairn_primitives::{
    constants::{COMPLEX_UPGRADER_ADDR, DEPLOYER_SYSTEM_CONTRACT_ADDR, FORCE_DEPLOYER_ADDR},
    hash_bytecode, validate_bytecode_hash,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{AccountInfo, AccountNonceOrdering, AccountVersion, DeployError, DeployEvent};

/// Domain tag for address derivation of salted deployments.
const CREATE2_DOMAIN: &[u8] = b"cairnCreate2";

/// Domain tag for address derivation of nonce-based deployments.
const CREATE_DOMAIN: &[u8] = b"cairnCreate";

/// One force-deployment instruction.
#[derive(Clone, Debug, PartialEq, Eq, Arbitrary, Serialize, Deserialize)]
pub struct ForceDeployment {
    /// Versioned hash of the code to place.
    pub bytecode_hash: B256,
    /// Where to place it.
    pub new_address: Address,
    /// Whether to run constructor logic after placement.  False is used to
    /// restore an address to previously deployed code without side effects.
    pub call_constructor: bool,
    /// Value to endow the account with.
    pub value: U256,
    /// Constructor input.
    pub input: Bytes,
}

/// Execution-layer state: accounts, published bytecode, deployment events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecLayer {
    accounts: BTreeMap<Address, AccountInfo>,
    known_bytecodes: BTreeMap<B256, Bytes>,
    events: Vec<DeployEvent>,
}

impl ExecLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a bytecode blob available as a factory dependency and returns
    /// its versioned hash.
    pub fn publish_bytecode(&mut self, code: &[u8]) -> Result<B256, DeployError> {
        let hash = hash_bytecode(code)?;
        if self
            .known_bytecodes
            .insert(hash, Bytes::copy_from_slice(code))
            .is_none()
        {
            self.events
                .push(DeployEvent::BytecodePublished { bytecode_hash: hash });
            debug!(%hash, len = code.len(), "published bytecode");
        }
        Ok(hash)
    }

    pub fn is_bytecode_known(&self, hash: B256) -> bool {
        self.known_bytecodes.contains_key(&hash)
    }

    /// Deterministically places code at fixed addresses.
    ///
    /// Only the force-deployer pseudo-caller and the one-shot upgrader
    /// address may invoke this.  The batch is atomic: any failure leaves
    /// the account table untouched.
    pub fn force_deploy_on_addresses(
        &mut self,
        caller: Address,
        deployments: &[ForceDeployment],
    ) -> Result<(), DeployError> {
        if caller != FORCE_DEPLOYER_ADDR && caller != COMPLEX_UPGRADER_ADDR {
            return Err(DeployError::Unauthorized(caller));
        }

        let mut staged = self.clone();
        for deployment in deployments {
            staged.force_deploy_one(caller, deployment)?;
        }
        *self = staged;
        info!(count = deployments.len(), %caller, "force deployed contracts");
        Ok(())
    }

    fn force_deploy_one(
        &mut self,
        caller: Address,
        deployment: &ForceDeployment,
    ) -> Result<(), DeployError> {
        validate_bytecode_hash(deployment.bytecode_hash)?;
        if !self.is_bytecode_known(deployment.bytecode_hash) {
            return Err(DeployError::UnknownBytecode(deployment.bytecode_hash));
        }

        let account = self.accounts.entry(deployment.new_address).or_default();
        account.code_hash = deployment.bytecode_hash;
        account.balance += deployment.value;
        if deployment.call_constructor {
            // Constructor execution counts as the account's first nonce use.
            account.nonce = account.nonce.max(1);
        }

        self.events.push(DeployEvent::ContractDeployed {
            deployer: caller,
            bytecode_hash: deployment.bytecode_hash,
            address: deployment.new_address,
        });
        if deployment.call_constructor {
            self.events.push(DeployEvent::ConstructorExecuted {
                address: deployment.new_address,
                value: deployment.value,
                input: deployment.input.clone(),
            });
        }
        Ok(())
    }

    /// Address derivation for salted deterministic deployments.
    pub fn get_new_address_create2(
        sender: Address,
        bytecode_hash: B256,
        salt: B256,
        input: &[u8],
    ) -> Address {
        let mut preimage = Vec::with_capacity(32 * 5);
        preimage.extend_from_slice(keccak256(CREATE2_DOMAIN).as_slice());
        preimage.extend_from_slice(B256::left_padding_from(sender.as_slice()).as_slice());
        preimage.extend_from_slice(salt.as_slice());
        preimage.extend_from_slice(bytecode_hash.as_slice());
        preimage.extend_from_slice(keccak256(input).as_slice());
        Address::from_slice(&keccak256(&preimage)[12..])
    }

    /// Address derivation for nonce-based deployments.
    pub fn get_new_address_create(sender: Address, sender_nonce: u64) -> Address {
        let mut preimage = Vec::with_capacity(32 * 3);
        preimage.extend_from_slice(keccak256(CREATE_DOMAIN).as_slice());
        preimage.extend_from_slice(B256::left_padding_from(sender.as_slice()).as_slice());
        preimage.extend_from_slice(B256::from(U256::from(sender_nonce)).as_slice());
        Address::from_slice(&keccak256(&preimage)[12..])
    }

    /// Changes the abstraction version of an account.  Only the account
    /// itself (via the deployer system contract) may do this.
    pub fn update_account_version(
        &mut self,
        caller: Address,
        account: Address,
        version: AccountVersion,
    ) -> Result<(), DeployError> {
        if caller != account && caller != DEPLOYER_SYSTEM_CONTRACT_ADDR {
            return Err(DeployError::NotSelf { caller, account });
        }
        self.accounts.entry(account).or_default().aa_version = version;
        self.events.push(DeployEvent::AccountVersionUpdated {
            address: account,
            version,
        });
        Ok(())
    }

    /// Changes the nonce ordering of an account.  Loosening to arbitrary
    /// ordering is deprecated and always rejected.
    pub fn update_nonce_ordering(
        &mut self,
        caller: Address,
        account: Address,
        ordering: AccountNonceOrdering,
    ) -> Result<(), DeployError> {
        if caller != account && caller != DEPLOYER_SYSTEM_CONTRACT_ADDR {
            return Err(DeployError::NotSelf { caller, account });
        }
        if ordering == AccountNonceOrdering::Arbitrary {
            return Err(DeployError::InvalidNonceOrderingChange(account));
        }
        self.accounts.entry(account).or_default().nonce_ordering = ordering;
        self.events.push(DeployEvent::NonceOrderingUpdated {
            address: account,
            ordering,
        });
        Ok(())
    }

    pub fn account(&self, address: Address) -> Option<&AccountInfo> {
        self.accounts.get(&address)
    }

    pub fn code_hash_of(&self, address: Address) -> B256 {
        self.accounts
            .get(&address)
            .map(|a| a.code_hash)
            .unwrap_or(B256::ZERO)
    }

    pub fn events(&self) -> &[DeployEvent] {
        &self.events
    }
}
