//! Core value types shared across the protocol governance crates.
//!
//! Everything here is a pure data type or a pure function: the packed
//! semantic-version codec, function selectors, the versioned bytecode hash
//! format, and the protocol constants the upgrade machinery enforces.

pub mod bytecode;
pub mod constants;
pub mod selector;
pub mod version;

pub use bytecode::{hash_bytecode, validate_bytecode_hash, BytecodeError};
pub use selector::Selector;
pub use version::{ProtocolSemVer, ProtocolVersion, VersionError};
