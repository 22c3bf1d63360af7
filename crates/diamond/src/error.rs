//! Facet-cut engine errors.

use alloy_primitives::Address;
use cairn_primitives::Selector;

use crate::FacetCutAction;

/// Errors from applying facet cuts or resolving selectors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiamondError {
    /// The action's routing precondition does not hold for a selector:
    /// Add requires the selector to be unrouted, Replace requires it to
    /// route to a different non-zero facet, Remove requires it to be
    /// routed.
    #[error("invalid {action:?} cut for selector {selector}: currently routed to {current}")]
    InvalidFacetCutAction {
        action: FacetCutAction,
        selector: Selector,
        current: Address,
    },

    /// Add/Replace cuts must name a non-zero facet.
    #[error("{0:?} cut with zero facet address")]
    ZeroFacetAddress(FacetCutAction),

    /// Remove cuts must name the zero facet.
    #[error("remove cut must use the zero facet address, got {0}")]
    RemoveWithNonZeroFacet(Address),

    /// A cut with no selectors is meaningless and rejected.
    #[error("cut for facet {0} has no selectors")]
    EmptySelectors(Address),

    /// All selectors of one facet must share a freezability flag.
    #[error("facet {facet} freezability mismatch: registered {registered}, cut says {proposed}")]
    FreezabilityMismatch {
        facet: Address,
        registered: bool,
        proposed: bool,
    },

    /// Routing lookup for an unregistered selector.
    #[error("selector {0} is not registered")]
    SelectorNotRegistered(Selector),

    /// Routing to a freezable facet while the diamond is frozen.
    #[error("selector {0} routes to a freezable facet and the diamond is frozen")]
    FacetFrozen(Selector),

    /// Freeze/unfreeze called in the wrong state.
    #[error("diamond is already frozen")]
    AlreadyFrozen,

    /// Freeze/unfreeze called in the wrong state.
    #[error("diamond is not frozen")]
    NotFrozen,

    /// The post-cut initializer failed; the whole batch was rolled back.
    #[error("diamond initializer failed: {0}")]
    InitFailed(String),
}
