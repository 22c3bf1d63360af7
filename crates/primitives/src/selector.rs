//! Function selectors, the routing key of the facet table.

use std::fmt;

use alloy_primitives::keccak256;
use arbitrary::Arbitrary;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A 4-byte function selector.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Arbitrary)]
pub struct Selector([u8; 4]);

impl Selector {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Derives the selector of a canonical function signature, e.g.
    /// `"acceptOwnership()"`.
    pub fn from_signature(sig: &str) -> Self {
        let digest = keccak256(sig.as_bytes());
        Self([digest[0], digest[1], digest[2], digest[3]])
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:02x}{:02x}{:02x}{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({self})")
    }
}

impl From<[u8; 4]> for Selector {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            let s = s.strip_prefix("0x").unwrap_or(&s);
            if s.len() != 8 {
                return Err(de::Error::custom("selector must be 4 bytes"));
            }
            let mut bytes = [0u8; 4];
            for (i, chunk) in bytes.iter_mut().enumerate() {
                *chunk = u8::from_str_radix(&s[2 * i..2 * i + 2], 16)
                    .map_err(de::Error::custom)?;
            }
            Ok(Self(bytes))
        } else {
            let bytes = <[u8; 4]>::deserialize(deserializer)?;
            Ok(Self(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_derivation() {
        // keccak256("transfer(address,uint256)") starts with a9059cbb.
        let sel = Selector::from_signature("transfer(address,uint256)");
        assert_eq!(sel, Selector::new([0xa9, 0x05, 0x9c, 0xbb]));
        assert_eq!(sel.to_string(), "0xa9059cbb");
    }

    #[test]
    fn serde_human_readable_roundtrip() {
        let sel = Selector::new([0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_string(&sel).unwrap();
        assert_eq!(json, "\"0xdeadbeef\"");
        let back: Selector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sel);
    }
}
