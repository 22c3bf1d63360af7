//! Facet-cut instructions.

use alloy_primitives::Address;
use arbitrary::Arbitrary;
use cairn_primitives::Selector;
use serde::{Deserialize, Serialize};

/// What a cut does to each of its selectors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Arbitrary, Serialize, Deserialize)]
pub enum FacetCutAction {
    Add,
    Replace,
    Remove,
}

/// One batch entry of the cut operation.
#[derive(Clone, Debug, PartialEq, Eq, Arbitrary, Serialize, Deserialize)]
pub struct FacetCut {
    /// Target facet; zero for Remove cuts.
    pub facet: Address,
    pub action: FacetCutAction,
    /// Whether the facet stays callable once the diamond is frozen.
    pub is_freezable: bool,
    pub selectors: Vec<Selector>,
}

impl FacetCut {
    pub fn add(facet: Address, is_freezable: bool, selectors: Vec<Selector>) -> Self {
        Self {
            facet,
            action: FacetCutAction::Add,
            is_freezable,
            selectors,
        }
    }

    pub fn replace(facet: Address, is_freezable: bool, selectors: Vec<Selector>) -> Self {
        Self {
            facet,
            action: FacetCutAction::Replace,
            is_freezable,
            selectors,
        }
    }

    pub fn remove(selectors: Vec<Selector>) -> Self {
        Self {
            facet: Address::ZERO,
            action: FacetCutAction::Remove,
            is_freezable: false,
            selectors,
        }
    }
}
