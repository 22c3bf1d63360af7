//! Routing table state and the batch-cut operation.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::Address;
use cairn_primitives::Selector;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{DiamondError, FacetCut, FacetCutAction};

/// Routing record of a single selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorInfo {
    pub facet: Address,
    pub is_freezable: bool,
}

/// Introspection view of one facet and its selectors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub address: Address,
    pub is_freezable: bool,
    pub selectors: Vec<Selector>,
}

/// Post-cut initializer, executed against the staged table.
///
/// The delegated-call initializer of the original design re-architected as
/// explicit state passing: the hook gets the staged diamond state and an
/// opaque parameter blob, and any failure rolls back the whole cut batch.
pub trait DiamondInit {
    fn initialize(&self, diamond: &mut DiamondState, calldata: &[u8]) -> Result<(), DiamondError>;
}

/// The authoritative selector→facet routing table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiamondState {
    routing: BTreeMap<Selector, SelectorInfo>,
    facet_index: BTreeMap<Address, BTreeSet<Selector>>,
    frozen: bool,
}

impl DiamondState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a batch of cuts, then the optional initializer, atomically.
    ///
    /// Any failure leaves the table exactly as it was before the call.
    pub fn apply_cuts(
        &mut self,
        cuts: &[FacetCut],
        init: Option<(&dyn DiamondInit, &[u8])>,
    ) -> Result<(), DiamondError> {
        let mut staged = self.clone();
        for cut in cuts {
            staged.apply_one(cut)?;
        }
        if let Some((initializer, calldata)) = init {
            initializer.initialize(&mut staged, calldata)?;
        }
        info!(
            cuts = cuts.len(),
            selectors = staged.routing.len(),
            "applied facet cut batch"
        );
        *self = staged;
        Ok(())
    }

    fn apply_one(&mut self, cut: &FacetCut) -> Result<(), DiamondError> {
        if cut.selectors.is_empty() {
            return Err(DiamondError::EmptySelectors(cut.facet));
        }
        match cut.action {
            FacetCutAction::Add => self.add_selectors(cut),
            FacetCutAction::Replace => self.replace_selectors(cut),
            FacetCutAction::Remove => self.remove_selectors(cut),
        }
    }

    fn check_freezability(&self, facet: Address, proposed: bool) -> Result<(), DiamondError> {
        // A facet's selectors must agree on freezability; take any already
        // registered selector of this facet as the reference.
        if let Some(sel) = self.facet_index.get(&facet).and_then(|s| s.first()) {
            let registered = self.routing[sel].is_freezable;
            if registered != proposed {
                return Err(DiamondError::FreezabilityMismatch {
                    facet,
                    registered,
                    proposed,
                });
            }
        }
        Ok(())
    }

    fn add_selectors(&mut self, cut: &FacetCut) -> Result<(), DiamondError> {
        if cut.facet.is_zero() {
            return Err(DiamondError::ZeroFacetAddress(FacetCutAction::Add));
        }
        self.check_freezability(cut.facet, cut.is_freezable)?;
        for &selector in &cut.selectors {
            if let Some(info) = self.routing.get(&selector) {
                return Err(DiamondError::InvalidFacetCutAction {
                    action: FacetCutAction::Add,
                    selector,
                    current: info.facet,
                });
            }
            self.route(selector, cut.facet, cut.is_freezable);
        }
        Ok(())
    }

    fn replace_selectors(&mut self, cut: &FacetCut) -> Result<(), DiamondError> {
        if cut.facet.is_zero() {
            return Err(DiamondError::ZeroFacetAddress(FacetCutAction::Replace));
        }
        self.check_freezability(cut.facet, cut.is_freezable)?;
        for &selector in &cut.selectors {
            let current = self.routing.get(&selector).map(|i| i.facet);
            match current {
                Some(facet) if facet != cut.facet => {
                    self.unroute(selector, facet);
                    self.route(selector, cut.facet, cut.is_freezable);
                }
                other => {
                    return Err(DiamondError::InvalidFacetCutAction {
                        action: FacetCutAction::Replace,
                        selector,
                        current: other.unwrap_or(Address::ZERO),
                    });
                }
            }
        }
        Ok(())
    }

    fn remove_selectors(&mut self, cut: &FacetCut) -> Result<(), DiamondError> {
        if !cut.facet.is_zero() {
            return Err(DiamondError::RemoveWithNonZeroFacet(cut.facet));
        }
        for &selector in &cut.selectors {
            match self.routing.get(&selector).map(|i| i.facet) {
                Some(facet) => self.unroute(selector, facet),
                None => {
                    return Err(DiamondError::InvalidFacetCutAction {
                        action: FacetCutAction::Remove,
                        selector,
                        current: Address::ZERO,
                    });
                }
            }
        }
        Ok(())
    }

    fn route(&mut self, selector: Selector, facet: Address, is_freezable: bool) {
        debug!(%selector, %facet, is_freezable, "routing selector");
        self.routing.insert(selector, SelectorInfo { facet, is_freezable });
        self.facet_index.entry(facet).or_default().insert(selector);
    }

    fn unroute(&mut self, selector: Selector, facet: Address) {
        self.routing.remove(&selector);
        if let Some(set) = self.facet_index.get_mut(&facet) {
            set.remove(&selector);
            if set.is_empty() {
                self.facet_index.remove(&facet);
            }
        }
    }

    /// Builds the distinguished bulk-remove batch retiring every currently
    /// registered selector, used when swapping out an entire facet set.
    pub fn cut_to_remove_everything(&self) -> Vec<FacetCut> {
        if self.routing.is_empty() {
            return Vec::new();
        }
        vec![FacetCut::remove(self.routing.keys().copied().collect())]
    }

    /// All facets with their selectors, for external introspection.
    pub fn facets(&self) -> Vec<Facet> {
        self.facet_index
            .iter()
            .map(|(&address, selectors)| Facet {
                address,
                // Non-empty by construction; every indexed selector routes.
                is_freezable: self.routing[selectors.first().unwrap()].is_freezable,
                selectors: selectors.iter().copied().collect(),
            })
            .collect()
    }

    /// The facet a selector routes to, if any.
    pub fn facet_of(&self, selector: Selector) -> Option<Address> {
        self.routing.get(&selector).map(|i| i.facet)
    }

    pub fn is_function_freezable(&self, selector: Selector) -> Option<bool> {
        self.routing.get(&selector).map(|i| i.is_freezable)
    }

    pub fn selector_count(&self) -> usize {
        self.routing.len()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn freeze(&mut self) -> Result<(), DiamondError> {
        if self.frozen {
            return Err(DiamondError::AlreadyFrozen);
        }
        self.frozen = true;
        info!("diamond frozen");
        Ok(())
    }

    pub fn unfreeze(&mut self) -> Result<(), DiamondError> {
        if !self.frozen {
            return Err(DiamondError::NotFrozen);
        }
        self.frozen = false;
        info!("diamond unfrozen");
        Ok(())
    }

    /// Routing lookup honoring the freeze state: freezable facets are not
    /// callable while the diamond is frozen.
    pub fn resolve(&self, selector: Selector) -> Result<Address, DiamondError> {
        let info = self
            .routing
            .get(&selector)
            .ok_or(DiamondError::SelectorNotRegistered(selector))?;
        if self.frozen && info.is_freezable {
            return Err(DiamondError::FacetFrozen(selector));
        }
        Ok(info.facet)
    }
}
