//! Versioned bytecode hashing.
//!
//! Deployable bytecode is identified by a marked sha256 hash: byte 0 is the
//! format version (currently 1), byte 1 is zero, bytes 2..4 carry the code
//! length in 32-byte words, and the remainder is the tail of the sha256
//! digest.  The length-in-words must be odd, which makes the all-zero hash
//! (and any plain sha256 output) structurally invalid as a code identifier.

use alloy_primitives::B256;
use sha2::{Digest, Sha256};

/// Current bytecode hash format version marker.
const BYTECODE_HASH_VERSION: u8 = 1;

/// Word size the format counts code length in.
const WORD_LEN: usize = 32;

/// Errors from hashing or validating deployable bytecode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BytecodeError {
    /// Code length is not a multiple of 32 bytes.
    #[error("bytecode length {0} is not word aligned")]
    NotWordAligned(usize),

    /// Code length in words must be odd.
    #[error("bytecode word count {0} is even")]
    EvenWordCount(usize),

    /// Code is too long to express in the 16-bit length field.
    #[error("bytecode word count {0} exceeds the format limit")]
    TooLarge(usize),

    /// A hash does not carry the expected version marker.
    #[error("unsupported bytecode hash version {0}")]
    UnsupportedVersion(u8),

    /// The reserved marker byte is non-zero.
    #[error("malformed bytecode hash marker")]
    MalformedMarker,
}

/// Computes the versioned hash of deployable bytecode.
pub fn hash_bytecode(code: &[u8]) -> Result<B256, BytecodeError> {
    if code.len() % WORD_LEN != 0 {
        return Err(BytecodeError::NotWordAligned(code.len()));
    }
    let words = code.len() / WORD_LEN;
    if words >= 1 << 16 {
        return Err(BytecodeError::TooLarge(words));
    }
    if words % 2 == 0 {
        return Err(BytecodeError::EvenWordCount(words));
    }

    let digest = Sha256::digest(code);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out[0] = BYTECODE_HASH_VERSION;
    out[1] = 0;
    out[2..4].copy_from_slice(&(words as u16).to_be_bytes());
    Ok(B256::from(out))
}

/// Checks a bytecode hash for structural validity, returning the code length
/// in words.
pub fn validate_bytecode_hash(hash: B256) -> Result<u16, BytecodeError> {
    if hash[0] != BYTECODE_HASH_VERSION {
        return Err(BytecodeError::UnsupportedVersion(hash[0]));
    }
    if hash[1] != 0 {
        return Err(BytecodeError::MalformedMarker);
    }
    let words = u16::from_be_bytes([hash[2], hash[3]]);
    if words % 2 == 0 {
        return Err(BytecodeError::EvenWordCount(words as usize));
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_validate() {
        let code = vec![0xabu8; 3 * WORD_LEN];
        let hash = hash_bytecode(&code).unwrap();
        assert_eq!(hash[0], BYTECODE_HASH_VERSION);
        assert_eq!(validate_bytecode_hash(hash).unwrap(), 3);
    }

    #[test]
    fn rejects_unaligned() {
        assert_eq!(
            hash_bytecode(&[0u8; 33]),
            Err(BytecodeError::NotWordAligned(33))
        );
    }

    #[test]
    fn rejects_even_word_count() {
        assert_eq!(
            hash_bytecode(&[0u8; 2 * WORD_LEN]),
            Err(BytecodeError::EvenWordCount(2))
        );
    }

    #[test]
    fn rejects_oversized() {
        let code = vec![0u8; (1 << 16) * WORD_LEN];
        assert_eq!(hash_bytecode(&code), Err(BytecodeError::TooLarge(1 << 16)));
    }

    #[test]
    fn zero_hash_is_invalid() {
        assert!(validate_bytecode_hash(B256::ZERO).is_err());
    }

    #[test]
    fn different_code_different_hash() {
        let a = hash_bytecode(&vec![1u8; WORD_LEN]).unwrap();
        let b = hash_bytecode(&vec![2u8; WORD_LEN]).unwrap();
        assert_ne!(a, b);
    }
}
