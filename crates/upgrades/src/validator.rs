//! Structural and resource-bound validation of L1→L2 transactions.

use alloy_primitives::U256;
use cairn_primitives::constants::{
    MAX_GAS_PER_PUBDATA_BYTE, MAX_NEW_FACTORY_DEPS, MEMORY_OVERHEAD_GAS, TX_SLOT_OVERHEAD_GAS,
};
use cairn_upgrade_types::L2CanonicalTransaction;

use crate::TxValidationError;

/// Minimal gas any L1→L2 transaction needs just for its slot and encoding.
pub fn minimal_gas_limit(tx: &L2CanonicalTransaction) -> u64 {
    TX_SLOT_OVERHEAD_GAS + MEMORY_OVERHEAD_GAS * tx.encoding_len() as u64
}

/// Checks the resource bounds every L1→L2 transaction must respect.
pub fn validate_l1_to_l2_transaction(
    tx: &L2CanonicalTransaction,
    priority_tx_max_gas_limit: u64,
) -> Result<(), TxValidationError> {
    if tx.gas_limit > U256::from(priority_tx_max_gas_limit) {
        return Err(TxValidationError::TooMuchGas {
            limit: tx.gas_limit,
            max: priority_tx_max_gas_limit,
        });
    }
    if tx.gas_per_pubdata_byte_limit.is_zero() {
        return Err(TxValidationError::PubdataGasPriceZero);
    }
    if tx.gas_per_pubdata_byte_limit > U256::from(MAX_GAS_PER_PUBDATA_BYTE) {
        return Err(TxValidationError::PubdataGasPriceTooHigh {
            got: tx.gas_per_pubdata_byte_limit,
            max: MAX_GAS_PER_PUBDATA_BYTE,
        });
    }
    if tx.factory_deps.len() > MAX_NEW_FACTORY_DEPS {
        return Err(TxValidationError::TooManyFactoryDeps {
            count: tx.factory_deps.len(),
            max: MAX_NEW_FACTORY_DEPS,
        });
    }

    let minimum = minimal_gas_limit(tx);
    if tx.gas_limit < U256::from(minimum) {
        return Err(TxValidationError::NotEnoughGas {
            limit: tx.gas_limit,
            minimum,
        });
    }
    Ok(())
}

/// Largest value representable as a 160-bit address.
fn max_address() -> U256 {
    (U256::ONE << 160) - U256::ONE
}

/// Structural checks specific to system-upgrade transactions: they come
/// from the system address space, target a real address, and carry none of
/// the user-transaction fields.
pub fn validate_upgrade_transaction(
    tx: &L2CanonicalTransaction,
) -> Result<(), TxValidationError> {
    if tx.from > U256::from(u16::MAX) {
        return Err(TxValidationError::SenderOutOfSystemRange(tx.from));
    }
    if tx.to > max_address() {
        return Err(TxValidationError::RecipientOutOfRange(tx.to));
    }
    if !tx.value.is_zero() {
        return Err(TxValidationError::NonZeroValue);
    }
    if !tx.paymaster.is_zero() {
        return Err(TxValidationError::NonZeroPaymaster);
    }
    if !tx.signature.is_empty() || !tx.paymaster_input.is_empty() {
        return Err(TxValidationError::UnexpectedSignedFields);
    }
    for (i, word) in tx.reserved.iter().enumerate() {
        if !word.is_zero() {
            return Err(TxValidationError::ReservedFieldNonZero(i));
        }
    }
    Ok(())
}
