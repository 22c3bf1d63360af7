//! Transactional execution of the rollout call-batches over the assembled
//! subsystems.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256};
use cairn_diamond::{DiamondError, DiamondState, FacetCut};
use cairn_force_deploy::{DeployError, ExecLayer, ForceDeployment};
use cairn_primitives::{constants::MAX_ALLOWED_MINOR_VERSION_DELTA, ProtocolVersion};
use cairn_state::ChainState;
use cairn_upgrade_types::ProposedUpgrade;
use cairn_upgrades::{UpgradeContext, UpgradeError, UpgradeHandler};
use tracing::{debug, info};

use crate::{CallBatch, EcosystemConfig, FeeConfig, GovernanceCall};

/// Errors aborting a governance call batch or the chain upgrade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RolloutError {
    /// The caller holds no authority over the contract it targets.
    #[error("caller {0} is not authorized")]
    Unauthorized(Address),

    /// The target is not a contract the orchestrator tracks.
    #[error("unknown contract {0}")]
    UnknownContract(Address),

    /// Ownership acceptance without a matching pending handover.
    #[error("{caller} is not the pending owner of {target}")]
    NotPendingOwner { target: Address, caller: Address },

    /// Implementation swap on a contract governance does not yet own.
    #[error("ownership of {0} has not been accepted")]
    OwnershipNotAccepted(Address),

    /// Stage 2 ran before stage 1 registered the new version.
    #[error("no protocol version has been registered")]
    VersionNotRegistered,

    /// The registered version must exceed the chain's current one.
    #[error("version {proposed} is not greater than current {current}")]
    VersionNotNewer {
        proposed: ProtocolVersion,
        current: ProtocolVersion,
    },

    /// The executed proposal targets a different version than stage 1
    /// registered.
    #[error("proposal targets {proposed}, registered version is {registered}")]
    VersionMismatch {
        proposed: ProtocolVersion,
        registered: ProtocolVersion,
    },

    /// The cooling-off timer can only be started once per rollout.
    #[error("upgrade timer already started")]
    TimerAlreadyStarted,

    /// The timer gate ran before the timer was started.
    #[error("upgrade timer has not been started")]
    TimerNotStarted,

    /// The cooling-off window has not elapsed yet.
    #[error("upgrade timer deadline {deadline} not reached at {now}")]
    UpgradeTimerNotElapsed { deadline: u64, now: u64 },

    /// The chain upgrade ran before stage 2 completed.
    #[error("rollout has not completed stage 2")]
    RolloutNotReady,

    /// Facet-cut application failure.
    #[error(transparent)]
    Diamond(#[from] DiamondError),

    /// Chain upgrade failure.
    #[error(transparent)]
    Upgrade(#[from] UpgradeError),

    /// Force-deployment failure.
    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// The cooling-off timer stage 1 starts and stage 2 asserts against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpgradeTimer {
    deadline: Option<u64>,
}

impl UpgradeTimer {
    fn start(&mut self, now: u64, delay: u64) -> Result<(), RolloutError> {
        if self.deadline.is_some() {
            return Err(RolloutError::TimerAlreadyStarted);
        }
        self.deadline = Some(now.saturating_add(delay));
        Ok(())
    }

    fn assert_elapsed(&self, now: u64) -> Result<(), RolloutError> {
        match self.deadline {
            None => Err(RolloutError::TimerNotStarted),
            Some(deadline) if now < deadline => {
                Err(RolloutError::UpgradeTimerNotElapsed { deadline, now })
            }
            Some(_) => Ok(()),
        }
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct OwnedContract {
    owner: Address,
    pending_owner: Option<Address>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct RegisteredVersion {
    version: ProtocolVersion,
    facet_cuts: Vec<FacetCut>,
}

/// The orchestrated ecosystem: chain state, routing table, execution layer
/// and the governance bookkeeping the rollout batches mutate.
///
/// Batches execute transactionally; readiness is observable only after the
/// final stage-2 call has succeeded.
#[derive(Clone, Debug)]
pub struct Ecosystem {
    governance: Address,
    chain: ChainState,
    diamond: DiamondState,
    exec: ExecLayer,
    owned: BTreeMap<Address, OwnedContract>,
    implementations: BTreeMap<Address, Address>,
    /// Vault address and its base token, once stage 2 rewires them.
    token_vault_wiring: Option<(Address, Address)>,
    validator_timelock: Address,
    chain_creation_enabled: bool,
    timer: UpgradeTimer,
    registered: Option<RegisteredVersion>,
    /// Deadline after which the previous protocol version stops being
    /// accepted; `u64::MAX` until stage 2 lifts it to zero.
    old_version_deadline: u64,
    fees: FeeConfig,
    ready: bool,
}

impl Ecosystem {
    /// Assembles the ecosystem around an existing chain state.  The target
    /// contracts start owned by the deployer with a handover to governance
    /// already initiated.
    pub fn new(config: &EcosystemConfig, chain: ChainState) -> Self {
        let owned = config
            .ownership_targets
            .iter()
            .map(|target| {
                (
                    *target,
                    OwnedContract {
                        owner: config.deployer,
                        pending_owner: Some(config.governance),
                    },
                )
            })
            .collect();
        Self {
            governance: config.governance,
            chain,
            diamond: DiamondState::new(),
            exec: ExecLayer::new(),
            owned,
            implementations: BTreeMap::new(),
            token_vault_wiring: None,
            validator_timelock: config.contracts.validator_timelock,
            chain_creation_enabled: true,
            timer: UpgradeTimer::default(),
            registered: None,
            old_version_deadline: u64::MAX,
            fees: config.fees.clone(),
            ready: false,
        }
    }

    /// Initiates a two-step ownership handover.  Only the current owner
    /// may do this.
    pub fn propose_owner(
        &mut self,
        caller: Address,
        target: Address,
        new_owner: Address,
    ) -> Result<(), RolloutError> {
        let entry = self
            .owned
            .get_mut(&target)
            .ok_or(RolloutError::UnknownContract(target))?;
        if entry.owner != caller {
            return Err(RolloutError::Unauthorized(caller));
        }
        entry.pending_owner = Some(new_owner);
        Ok(())
    }

    /// Executes a governance call batch in order, transactionally: any
    /// failure leaves the whole ecosystem exactly as it was.
    pub fn execute_batch(
        &mut self,
        caller: Address,
        batch: &CallBatch,
        now: u64,
    ) -> Result<(), RolloutError> {
        if caller != self.governance {
            return Err(RolloutError::Unauthorized(caller));
        }
        let mut staged = self.clone();
        for call in batch {
            staged.apply_call(call, now)?;
        }
        *self = staged;
        info!(calls = batch.len(), "executed governance call batch");
        Ok(())
    }

    fn apply_call(&mut self, call: &GovernanceCall, now: u64) -> Result<(), RolloutError> {
        match call {
            GovernanceCall::AcceptOwnership { target } => {
                let entry = self
                    .owned
                    .get_mut(target)
                    .ok_or(RolloutError::UnknownContract(*target))?;
                if entry.pending_owner != Some(self.governance) {
                    return Err(RolloutError::NotPendingOwner {
                        target: *target,
                        caller: self.governance,
                    });
                }
                entry.owner = self.governance;
                entry.pending_owner = None;
                debug!(target = %target, "accepted ownership");
            }
            GovernanceCall::RegisterVersion {
                version,
                facet_cuts,
            } => {
                let current = self.chain.protocol_version();
                if *version <= current {
                    return Err(RolloutError::VersionNotNewer {
                        proposed: *version,
                        current,
                    });
                }
                self.registered = Some(RegisteredVersion {
                    version: *version,
                    facet_cuts: facet_cuts.clone(),
                });
                debug!(version = %version, "registered protocol version");
            }
            GovernanceCall::SetValidatorTimelock { timelock } => {
                self.validator_timelock = *timelock;
            }
            GovernanceCall::DisableChainCreation => {
                self.chain_creation_enabled = false;
            }
            GovernanceCall::StartTimer { delay } => {
                self.timer.start(now, *delay)?;
            }
            GovernanceCall::SwapImplementation {
                proxy,
                implementation,
            } => {
                let entry = self
                    .owned
                    .get(proxy)
                    .ok_or(RolloutError::UnknownContract(*proxy))?;
                if entry.owner != self.governance {
                    return Err(RolloutError::OwnershipNotAccepted(*proxy));
                }
                self.implementations.insert(*proxy, *implementation);
                debug!(proxy = %proxy, implementation = %implementation, "swapped implementation");
            }
            GovernanceCall::RewireTokenVault { vault, base_token } => {
                self.token_vault_wiring = Some((*vault, *base_token));
            }
            GovernanceCall::LiftOldVersionDeadline => {
                self.old_version_deadline = 0;
            }
            GovernanceCall::AssertTimerElapsed => {
                if self.registered.is_none() {
                    return Err(RolloutError::VersionNotRegistered);
                }
                self.timer.assert_elapsed(now)?;
                self.ready = true;
            }
        }
        Ok(())
    }

    /// Runs the chain upgrade itself: applies the registered facet cuts
    /// and executes the proposal, atomically across both subsystems.
    ///
    /// Gated on stage-2 completion and on the proposal targeting the
    /// registered version.
    pub fn upgrade_chain(
        &mut self,
        proposal: &ProposedUpgrade,
        handler: &mut dyn UpgradeHandler,
        now: u64,
    ) -> Result<B256, RolloutError> {
        if !self.ready {
            return Err(RolloutError::RolloutNotReady);
        }
        let registered = self
            .registered
            .clone()
            .ok_or(RolloutError::VersionNotRegistered)?;
        if proposal.new_protocol_version != registered.version {
            return Err(RolloutError::VersionMismatch {
                proposed: proposal.new_protocol_version,
                registered: registered.version,
            });
        }

        let ctx = UpgradeContext {
            now,
            max_minor_version_delta: MAX_ALLOWED_MINOR_VERSION_DELTA,
            priority_tx_max_gas_limit: self.fees.priority_tx_max_gas_limit,
        };
        let mut staged = self.clone();
        staged.diamond.apply_cuts(&registered.facet_cuts, None)?;
        let tx_hash = cairn_upgrades::upgrade(&mut staged.chain, proposal, &ctx, handler)?;
        *self = staged;
        info!(version = %registered.version, %tx_hash, "upgraded chain");
        Ok(tx_hash)
    }

    /// Force-deploys system contracts on the execution layer.
    pub fn force_deploy(
        &mut self,
        caller: Address,
        deployments: &[ForceDeployment],
    ) -> Result<(), RolloutError> {
        self.exec.force_deploy_on_addresses(caller, deployments)?;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn owner_of(&self, target: Address) -> Option<Address> {
        self.owned.get(&target).map(|entry| entry.owner)
    }

    pub fn implementation_of(&self, proxy: Address) -> Option<Address> {
        self.implementations.get(&proxy).copied()
    }

    pub fn token_vault_wiring(&self) -> Option<(Address, Address)> {
        self.token_vault_wiring
    }

    pub fn validator_timelock(&self) -> Address {
        self.validator_timelock
    }

    pub fn chain_creation_enabled(&self) -> bool {
        self.chain_creation_enabled
    }

    pub fn registered_version(&self) -> Option<ProtocolVersion> {
        self.registered.as_ref().map(|r| r.version)
    }

    pub fn old_version_deadline(&self) -> u64 {
        self.old_version_deadline
    }

    pub fn timer(&self) -> &UpgradeTimer {
        &self.timer
    }

    pub fn chain(&self) -> &ChainState {
        &self.chain
    }

    pub fn diamond(&self) -> &DiamondState {
        &self.diamond
    }

    pub fn exec(&self) -> &ExecLayer {
        &self.exec
    }

    pub fn exec_mut(&mut self) -> &mut ExecLayer {
        &mut self.exec
    }
}
