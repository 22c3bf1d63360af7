//! Upgrade state-machine errors.

use alloy_primitives::{B256, U256};
use cairn_primitives::{BytecodeError, ProtocolVersion};

/// Structural errors from L1→L2 transaction validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TxValidationError {
    /// Gas limit above the priority-transaction ceiling.
    #[error("gas limit {limit} exceeds the maximum of {max}")]
    TooMuchGas { limit: U256, max: u64 },

    /// Gas limit below what processing the encoding alone costs.
    #[error("gas limit {limit} is below the minimal {minimum}")]
    NotEnoughGas { limit: U256, minimum: u64 },

    /// Per-pubdata-byte gas price above the enforced bound.
    #[error("gas per pubdata byte {got} exceeds the maximum of {max}")]
    PubdataGasPriceTooHigh { got: U256, max: u64 },

    /// A zero pubdata price cannot pay for any published byte.
    #[error("gas per pubdata byte must be non-zero")]
    PubdataGasPriceZero,

    /// More factory dependencies than one transaction may publish.
    #[error("{count} factory dependencies exceed the limit of {max}")]
    TooManyFactoryDeps { count: usize, max: usize },

    /// Upgrade transactions must originate from the system address space.
    #[error("upgrade tx sender {0} is outside the system address space")]
    SenderOutOfSystemRange(U256),

    /// The recipient must be representable as an address.
    #[error("upgrade tx recipient {0} exceeds the address range")]
    RecipientOutOfRange(U256),

    /// Upgrade transactions carry no value.
    #[error("upgrade tx must not carry value")]
    NonZeroValue,

    /// Upgrade transactions carry no paymaster.
    #[error("upgrade tx must not set a paymaster")]
    NonZeroPaymaster,

    /// Upgrade transactions carry no signature.
    #[error("upgrade tx must not carry a signature or paymaster input")]
    UnexpectedSignedFields,

    /// Reserved fields must be zero until assigned a meaning.
    #[error("upgrade tx reserved field {0} is non-zero")]
    ReservedFieldNonZero(usize),
}

/// Errors aborting an upgrade call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpgradeError {
    /// The proposal's scheduled time has not come yet.
    #[error("upgrade scheduled for {scheduled}, current time {now}")]
    TimeNotReached { scheduled: u64, now: u64 },

    /// Proposed version is not strictly greater than the current one.
    #[error("proposed version {proposed} is not greater than current {current}")]
    ProtocolVersionTooSmall {
        proposed: ProtocolVersion,
        current: ProtocolVersion,
    },

    /// Major version is pinned to zero in this deployment generation.
    #[error("version {0} has a non-zero major component")]
    ProtocolMajorVersionNotZero(ProtocolVersion),

    /// Minor-version jump above the configured bound.
    #[error("minor version delta {delta} exceeds the maximum of {max}")]
    ProtocolVersionMinorDeltaTooBig { delta: u32, max: u32 },

    /// A previous upgrade transaction is still awaiting finalization.
    #[error("previous upgrade transaction {0} is not finalized")]
    PreviousUpgradeNotFinalized(B256),

    /// A previous upgrade's batch marker was never cleared.
    #[error("previous upgrade batch marker {0} is not cleaned")]
    PreviousUpgradeNotCleaned(u64),

    /// Patch upgrades cannot change the bootloader bytecode.
    #[error("patch-only upgrade cannot set a bootloader hash")]
    PatchUpgradeCantSetBootloader,

    /// Patch upgrades cannot change the default-account bytecode.
    #[error("patch-only upgrade cannot set a default-account hash")]
    PatchUpgradeCantSetDefaultAccount,

    /// Patch upgrades cannot register an L2 upgrade transaction.
    #[error("patch-only upgrade cannot set an upgrade transaction")]
    PatchCantSetUpgradeTxn,

    /// The upgrade transaction must use the system-upgrade type.
    #[error("invalid upgrade transaction type {0}")]
    InvalidTxType(U256),

    /// The upgrade-transaction nonce keys hashes by minor version.
    #[error("upgrade tx nonce {nonce} does not equal new minor version {minor}")]
    L2UpgradeNonceNotEqualToNewProtocolVersion { nonce: U256, minor: u32 },

    /// Preimage count does not match the transaction's dependency list.
    #[error("{got} factory dependency preimages, transaction lists {expected}")]
    UnexpectedNumberOfFactoryDeps { expected: usize, got: usize },

    /// A preimage does not hash to the hash the transaction commits to.
    #[error("factory dependency {index} hashes to {actual}, transaction commits to {expected}")]
    L2BytecodeHashMismatch {
        index: usize,
        expected: B256,
        actual: B256,
    },

    /// A factory dependency is not valid deployable bytecode.
    #[error(transparent)]
    Bytecode(#[from] BytecodeError),

    /// Transaction validation failure.
    #[error(transparent)]
    TxValidation(#[from] TxValidationError),

    /// A custom upgrade hook failed.
    #[error("upgrade hook failed: {0}")]
    HookFailed(String),
}
