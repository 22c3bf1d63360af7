//! Protocol constants and fixed execution-layer addresses.

use alloy_primitives::Address;
use hex_literal::hex;

/// Transaction type of the mandatory L2 system-upgrade transaction.
pub const SYSTEM_UPGRADE_L2_TX_TYPE: u64 = 254;

/// Transaction type of user-submitted priority transactions.
pub const PRIORITY_OPERATION_L2_TX_TYPE: u64 = 255;

/// Upper bound on the minor-version jump a single upgrade may make.
pub const MAX_ALLOWED_MINOR_VERSION_DELTA: u32 = 100;

/// Maximum number of factory dependencies one transaction may publish.
pub const MAX_NEW_FACTORY_DEPS: usize = 64;

/// Gas-limit ceiling for priority and system-upgrade transactions.
pub const PRIORITY_TX_MAX_GAS_LIMIT: u64 = 72_000_000;

/// Ceiling on the gas a transaction may quote per published pubdata byte.
pub const MAX_GAS_PER_PUBDATA_BYTE: u64 = 50_000;

/// Flat gas overhead charged for occupying a transaction slot.
pub const TX_SLOT_OVERHEAD_GAS: u64 = 10_000;

/// Gas overhead charged per byte of the transaction encoding.
pub const MEMORY_OVERHEAD_GAS: u64 = 10;

/// Extra lifetime granted to queued priority operations.  Deprecated and
/// pinned to zero; expiration is carried per operation instead.
pub const PRIORITY_EXPIRATION: u64 = 0;

/// Bootloader formal address.
pub const BOOTLOADER_ADDR: Address =
    Address::new(hex!("0000000000000000000000000000000000008001"));

/// The deployer system contract, owner of all deterministic deployments.
pub const DEPLOYER_SYSTEM_CONTRACT_ADDR: Address =
    Address::new(hex!("0000000000000000000000000000000000008006"));

/// Privileged pseudo-caller allowed to request force deployments.
pub const FORCE_DEPLOYER_ADDR: Address =
    Address::new(hex!("0000000000000000000000000000000000008007"));

/// The one-shot upgrader's fixed address.
pub const COMPLEX_UPGRADER_ADDR: Address =
    Address::new(hex!("000000000000000000000000000000000000800f"));

/// Genesis-upgrade logic address on the execution layer.
pub const L2_GENESIS_UPGRADE_ADDR: Address =
    Address::new(hex!("0000000000000000000000000000000000010001"));
