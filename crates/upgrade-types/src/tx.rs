//! The canonical L1→L2 transaction representation.

use alloy_primitives::{keccak256, Bytes, B256, U256};
use alloy_sol_types::{sol, SolValue};
use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

sol! {
    /// ABI mirror of [`L2CanonicalTransaction`], used only for hashing.
    struct CanonicalTxAbi {
        uint256 txType;
        uint256 sender;
        uint256 to;
        uint256 gasLimit;
        uint256 gasPerPubdataByteLimit;
        uint256 maxFeePerGas;
        uint256 maxPriorityFeePerGas;
        uint256 paymaster;
        uint256 nonce;
        uint256 value;
        uint256[4] reserved;
        bytes data;
        bytes signature;
        uint256[] factoryDeps;
        bytes paymasterInput;
        bytes reservedDynamic;
    }
}

/// A transaction destined for L2 execution, in its canonical hashable form.
///
/// Priority transactions and protocol-upgrade transactions both take this
/// shape.  Addresses travel as `uint256` so the layout stays stable if the
/// address width ever changes; the `reserved` fields exist for the same
/// reason.  For a system-upgrade transaction the `nonce` must equal the new
/// minor protocol version, which keys upgrade-transaction hashes uniquely
/// by minor version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Arbitrary, Serialize, Deserialize)]
pub struct L2CanonicalTransaction {
    pub tx_type: U256,
    pub from: U256,
    pub to: U256,
    pub gas_limit: U256,
    pub gas_per_pubdata_byte_limit: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    pub paymaster: U256,
    pub nonce: U256,
    pub value: U256,
    pub reserved: [U256; 4],
    pub data: Bytes,
    pub signature: Bytes,
    pub factory_deps: Vec<U256>,
    pub paymaster_input: Bytes,
    pub reserved_dynamic: Bytes,
}

impl L2CanonicalTransaction {
    /// A transaction with type zero is the "no L2 side effect" sentinel.
    pub fn is_noop(&self) -> bool {
        self.tx_type.is_zero()
    }

    /// Content hash: keccak256 over the ABI encoding of the full tuple.
    pub fn canonical_hash(&self) -> B256 {
        let abi = CanonicalTxAbi {
            txType: self.tx_type,
            sender: self.from,
            to: self.to,
            gasLimit: self.gas_limit,
            gasPerPubdataByteLimit: self.gas_per_pubdata_byte_limit,
            maxFeePerGas: self.max_fee_per_gas,
            maxPriorityFeePerGas: self.max_priority_fee_per_gas,
            paymaster: self.paymaster,
            nonce: self.nonce,
            value: self.value,
            reserved: self.reserved,
            data: self.data.to_vec().into(),
            signature: self.signature.to_vec().into(),
            factoryDeps: self.factory_deps.clone(),
            paymasterInput: self.paymaster_input.to_vec().into(),
            reservedDynamic: self.reserved_dynamic.to_vec().into(),
        };
        keccak256(abi.abi_encode())
    }

    /// Byte length of the ABI encoding, the basis of the overhead gas floor.
    pub fn encoding_len(&self) -> usize {
        // Static head (16 slots, `reserved` flattened to 4) plus the dynamic
        // tails, each padded to a word and prefixed with its length slot.
        let pad = |n: usize| n.div_ceil(32) * 32 + 32;
        (10 + 4 + 5) * 32
            + pad(self.data.len())
            + pad(self.signature.len())
            + 32
            + self.factory_deps.len() * 32
            + pad(self.paymaster_input.len())
            + pad(self.reserved_dynamic.len())
    }
}
