//! Recursion verification-key parameters.

use alloy_primitives::B256;
use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

/// Hashes of the recursion verification keys the proof system is pinned to.
///
/// An all-zero value is the "leave unchanged" sentinel in an upgrade
/// proposal, never a valid configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Arbitrary, Serialize, Deserialize)]
pub struct VerifierParams {
    pub recursion_node_level_vk_hash: B256,
    pub recursion_leaf_level_vk_hash: B256,
    pub recursion_circuits_set_vks_hash: B256,
}

impl VerifierParams {
    pub fn is_zero(&self) -> bool {
        self.recursion_node_level_vk_hash.is_zero()
            && self.recursion_leaf_level_vk_hash.is_zero()
            && self.recursion_circuits_set_vks_hash.is_zero()
    }
}
