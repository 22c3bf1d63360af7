//! Packed semantic-version codec.
//!
//! A protocol version is a `(major, minor, patch)` triple of `u32`s packed
//! into the low 96 bits of an integer, ordered by the packed value.  The
//! major component is pinned to zero in this deployment generation, which
//! the upgrade state machine enforces on every transition.

use std::fmt;

use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

/// Bit width of each version component.
const COMPONENT_BITS: u32 = 32;

/// Mask for a single version component.
const COMPONENT_MASK: u128 = (1 << COMPONENT_BITS) - 1;

/// Errors from constructing or decoding packed versions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The raw packed value does not fit into 96 bits.
    #[error("packed version {0:#x} exceeds 96 bits")]
    OutOfRange(u128),
}

/// An unpacked semantic version triple.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Arbitrary, Serialize,
    Deserialize,
)]
pub struct ProtocolSemVer {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProtocolSemVer {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Packs the triple into its canonical integer form.
    pub fn pack(self) -> ProtocolVersion {
        ProtocolVersion(
            ((self.major as u128) << (2 * COMPONENT_BITS))
                | ((self.minor as u128) << COMPONENT_BITS)
                | self.patch as u128,
        )
    }
}

impl fmt::Display for ProtocolSemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A packed protocol version.
///
/// Strictly increasing across upgrades; comparison is by packed value, which
/// coincides with lexicographic comparison of the triple.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProtocolVersion(u128);

impl ProtocolVersion {
    /// The zero version, `0.0.0`.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw packed value, rejecting anything wider than 96 bits.
    pub fn new(raw: u128) -> Result<Self, VersionError> {
        if raw >> (3 * COMPONENT_BITS) != 0 {
            return Err(VersionError::OutOfRange(raw));
        }
        Ok(Self(raw))
    }

    pub fn into_raw(self) -> u128 {
        self.0
    }

    /// Unpacks into the component triple.
    pub fn unpack(self) -> ProtocolSemVer {
        ProtocolSemVer {
            major: ((self.0 >> (2 * COMPONENT_BITS)) & COMPONENT_MASK) as u32,
            minor: ((self.0 >> COMPONENT_BITS) & COMPONENT_MASK) as u32,
            patch: (self.0 & COMPONENT_MASK) as u32,
        }
    }

    pub fn major(self) -> u32 {
        self.unpack().major
    }

    pub fn minor(self) -> u32 {
        self.unpack().minor
    }

    pub fn patch(self) -> u32 {
        self.unpack().patch
    }
}

impl From<ProtocolSemVer> for ProtocolVersion {
    fn from(v: ProtocolSemVer) -> Self {
        v.pack()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.unpack().fmt(f)
    }
}

impl<'a> Arbitrary<'a> for ProtocolVersion {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(ProtocolSemVer::arbitrary(u)?.pack())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn pack_layout() {
        let v = ProtocolSemVer::new(0, 0x19, 0).pack();
        assert_eq!(v.into_raw(), 0x19_0000_0000);

        let v = ProtocolSemVer::new(1, 2, 3).pack();
        assert_eq!(v.into_raw(), (1u128 << 64) | (2u128 << 32) | 3);
    }

    #[test]
    fn unpack_example() {
        let v = ProtocolSemVer::new(0, 5, 2).pack();
        assert_eq!(v.unpack(), ProtocolSemVer::new(0, 5, 2));
        assert_eq!(v.minor(), 5);
        assert_eq!(v.patch(), 2);
        assert_eq!(v.to_string(), "0.5.2");
    }

    #[test]
    fn new_rejects_wide_values() {
        assert!(ProtocolVersion::new(1u128 << 96).is_err());
        assert!(ProtocolVersion::new((1u128 << 96) - 1).is_ok());
    }

    #[test]
    fn ordering_matches_components() {
        let a = ProtocolSemVer::new(0, 25, 0).pack();
        let b = ProtocolSemVer::new(0, 25, 1).pack();
        let c = ProtocolSemVer::new(0, 26, 0).pack();
        assert!(a < b);
        assert!(b < c);
    }

    proptest! {
        #[test]
        fn roundtrip(major: u32, minor: u32, patch: u32) {
            let semver = ProtocolSemVer::new(major, minor, patch);
            let packed = semver.pack();
            prop_assert_eq!(packed.unpack(), semver);
            // Repacking the raw value must also be accepted.
            prop_assert_eq!(ProtocolVersion::new(packed.into_raw()).unwrap(), packed);
        }
    }
}
