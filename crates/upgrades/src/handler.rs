//! Custom upgrade extension points.

use cairn_state::StateCache;

use crate::UpgradeError;

/// Hooks a concrete upgrade can override.
///
/// The delegated "custom upgrade implementation" of the original design,
/// re-architected as explicit state passing: each hook gets the in-flight
/// state cache and an opaque calldata blob from the proposal.  A hook
/// failure aborts the whole upgrade call.
pub trait UpgradeHandler {
    /// Runs between the version transition and the verifier update.
    fn upgrade_l1_contracts(
        &mut self,
        _cache: &mut StateCache,
        _calldata: &[u8],
    ) -> Result<(), UpgradeError> {
        Ok(())
    }

    /// Runs after the L2 upgrade transaction is registered, for
    /// upgrade-specific side effects such as force deployments.
    fn post_upgrade(
        &mut self,
        _cache: &mut StateCache,
        _calldata: &[u8],
    ) -> Result<(), UpgradeError> {
        Ok(())
    }
}

/// The default handler: both hooks are no-ops.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopHandler;

impl UpgradeHandler for NoopHandler {}
