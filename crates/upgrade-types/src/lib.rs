//! Data types consumed by the upgrade state machine and the priority queue.

mod priority;
mod proposal;
mod tx;
mod verifier;

pub use priority::PriorityOperation;
pub use proposal::ProposedUpgrade;
pub use tx::L2CanonicalTransaction;
pub use verifier::VerifierParams;
