//! Shared test fixtures and an `Arbitrary`-backed generator.

use alloy_primitives::{Address, B256, U256};
use arbitrary::{Arbitrary, Unstructured};
use cairn_primitives::{
    constants::{FORCE_DEPLOYER_ADDR, SYSTEM_UPGRADE_L2_TX_TYPE},
    ProtocolVersion,
};
use cairn_state::ChainState;
use cairn_upgrade_types::{L2CanonicalTransaction, ProposedUpgrade, VerifierParams};
use rand_core::{CryptoRngCore, OsRng};

const ARB_GEN_LEN: usize = 65_536;

/// Generates arbitrary instances from a persistent random buffer.
#[derive(Debug)]
pub struct ArbitraryGenerator {
    buf: Vec<u8>,
}

impl Default for ArbitraryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArbitraryGenerator {
    pub fn new() -> Self {
        Self::new_with_size(ARB_GEN_LEN)
    }

    pub fn new_with_size(s: usize) -> Self {
        Self { buf: vec![0u8; s] }
    }

    /// Generates an arbitrary instance of type `T` using [`OsRng`].
    pub fn generate<T>(&mut self) -> T
    where
        T: for<'a> Arbitrary<'a> + Clone,
    {
        self.generate_with_rng::<T, OsRng>(&mut OsRng)
    }

    /// Generates an arbitrary instance of type `T` from the provided RNG.
    pub fn generate_with_rng<T, R>(&mut self, rng: &mut R) -> T
    where
        T: for<'a> Arbitrary<'a> + Clone,
        R: CryptoRngCore,
    {
        const MAX_ATTEMPTS: usize = 16;
        let mut last_error = None;

        for _ in 0..MAX_ATTEMPTS {
            rng.fill_bytes(&mut self.buf);
            let mut u = Unstructured::new(&self.buf);
            match T::arbitrary(&mut u) {
                Ok(value) => return value,
                Err(err) => last_error = Some(err),
            }
        }

        let error_msg = last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        panic!("Failed to generate arbitrary instance: {error_msg}");
    }
}

/// A minimal genesis state at the given protocol version, with zeroed
/// verifier configuration and system bytecode hashes.
pub fn genesis_chain_state(protocol_version: ProtocolVersion) -> ChainState {
    ChainState::genesis(
        protocol_version,
        Address::ZERO,
        VerifierParams::default(),
        B256::ZERO,
        B256::ZERO,
    )
}

/// A well-formed system-upgrade transaction whose nonce is keyed to the
/// given minor version.  No factory dependencies, no value transfer.
pub fn system_upgrade_tx(minor: u32) -> L2CanonicalTransaction {
    L2CanonicalTransaction {
        tx_type: U256::from(SYSTEM_UPGRADE_L2_TX_TYPE),
        from: U256::from_be_slice(FORCE_DEPLOYER_ADDR.as_slice()),
        to: U256::from(0x800fu64),
        gas_limit: U256::from(4_000_000u64),
        gas_per_pubdata_byte_limit: U256::from(800u64),
        nonce: U256::from(minor),
        ..Default::default()
    }
}

/// A valid upgrade proposal to the given version: executable immediately,
/// carrying a matching system-upgrade transaction and leaving verifier and
/// system bytecodes untouched.
pub fn proposed_upgrade(new_protocol_version: ProtocolVersion) -> ProposedUpgrade {
    ProposedUpgrade {
        l2_protocol_upgrade_tx: system_upgrade_tx(new_protocol_version.minor()),
        new_protocol_version,
        ..Default::default()
    }
}
