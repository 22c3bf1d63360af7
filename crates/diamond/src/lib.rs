//! The facet-cut engine: one authoritative selector→facet routing table.
//!
//! A "diamond" exposes many independently deployed logic units (facets)
//! behind a single address by routing on the 4-byte function selector.  The
//! only mutation entry point is [`DiamondState::apply_cuts`], which applies
//! a batch of add/replace/remove cuts atomically: the batch is staged on a
//! copy of the table and swapped in only if every cut, and the optional
//! initializer, succeeds.

mod cut;
mod error;
mod state;

pub use cut::{FacetCut, FacetCutAction};
pub use error::DiamondError;
pub use state::{DiamondInit, DiamondState, Facet, SelectorInfo};
