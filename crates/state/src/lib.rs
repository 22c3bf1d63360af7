//! Global protocol state owned by the upgrade state machine.
//!
//! One [`ChainState`] instance is the single mutable resource at the center
//! of the governance layer: the current protocol version, verifier
//! configuration, system bytecode hashes, the pending upgrade-transaction
//! marker, the priority queue and the event audit trail.  Multi-step
//! operations mutate a [`StateCache`] and commit atomically; anything that
//! fails mid-flight leaves the committed state untouched.

mod cache;
mod chain_state;
mod event;

pub use cache::StateCache;
pub use chain_state::{ChainState, StateError};
pub use event::ProtocolEvent;
