//! Two-stage upgrade rollout orchestration.
//!
//! Reads an [`EcosystemConfig`], builds the two ordered governance call
//! batches (stage 1: ownership acceptance and version registration; stage
//! 2: irreversible implementation swaps behind a cooling-off timer),
//! executes them transactionally against an [`Ecosystem`], and emits an
//! [`UpgradeArtifact`] for downstream tooling.

mod artifact;
mod calls;
mod config;
mod rollout;
mod stages;

pub use artifact::UpgradeArtifact;
pub use calls::{CallBatch, GovernanceCall};
pub use config::{
    ContractsConfig, EcosystemConfig, FeeConfig, ImplementationsConfig, TokenConfig,
    UpgradeConfig, VerifierConfig,
};
pub use rollout::{Ecosystem, RolloutError, UpgradeTimer};
pub use stages::{build_stage1, build_stage2};
