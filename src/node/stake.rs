use super::{require_payload, NodeInfo};
use crate::blockchain::{BlockView, Blockchain, StakeBlock, StakeLedger, ValidatorStake};
use crate::config::{Config, NodeVariant, StakingConfig};
use crate::consensus;
use crate::error::ChainError;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Chain and stake ledger, guarded together so a forge sees a consistent pair.
#[derive(Debug)]
pub struct StakeState {
    pub chain: Blockchain<StakeBlock>,
    pub stakes: StakeLedger,
}

#[derive(Debug, Clone, Serialize)]
pub struct StakeInfo {
    pub validators: StakeLedger,
}

/// Proof-of-stake node.
#[derive(Clone)]
pub struct StakeNode {
    name: String,
    state: Arc<RwLock<StakeState>>,
}

impl StakeNode {
    pub fn new(name: impl Into<String>, genesis_payload: &str, staking: &StakingConfig) -> Result<Self, ChainError> {
        let genesis_validator = staking.genesis_validator.trim();
        let chain = Blockchain::new(StakeBlock::genesis(genesis_payload, genesis_validator))?;

        let mut stakes = StakeLedger::new();
        if staking.genesis_stake > 0 {
            stakes.deposit(genesis_validator, staking.genesis_stake)?;
        }

        Ok(Self {
            name: name.into(),
            state: Arc::new(RwLock::new(StakeState { chain, stakes })),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ChainError> {
        Self::new(
            config.node_name(NodeVariant::Stake),
            &config.node.genesis_payload,
            &config.staking,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn list_chain(&self) -> Vec<BlockView<StakeBlock>> {
        self.state.read().await.chain.views()
    }

    /// Credits `amount` to `validator`; returns the validator's new total.
    pub async fn deposit_stake(&self, validator: &str, amount: u64) -> Result<u64, ChainError> {
        let mut state = self.state.write().await;
        let total = state.stakes.deposit(validator, amount)?;
        info!(validator = validator.trim(), amount, total, "Stake deposited");
        Ok(total)
    }

    /// Selects a validator from the current tip and appends a block forged by it.
    pub async fn forge(&self, payload: &str) -> Result<StakeBlock, ChainError> {
        let payload = require_payload(payload)?;

        let candidate = {
            let state = self.state.read().await;
            consensus::forge_candidate(state.chain.tip(), &state.stakes, &payload)?
        };

        let mut state = self.state.write().await;
        if let Err(e) = state.chain.apply_block(candidate.clone()) {
            error!(height = candidate.height, error = %e, "Forged block rejected by chain");
            return Err(ChainError::InvalidBlockProduced(e.to_string()));
        }
        info!(
            height = candidate.height,
            validator = %candidate.validator_id,
            hash = %candidate.hash,
            "Forged new block"
        );
        Ok(candidate)
    }

    pub async fn list_validators(&self) -> Vec<ValidatorStake> {
        self.state.read().await.stakes.validators()
    }

    pub async fn info(&self) -> NodeInfo<StakeInfo> {
        let state = self.state.read().await;
        NodeInfo::from_chain(
            &self.name,
            &state.chain,
            StakeInfo {
                validators: state.stakes.clone(),
            },
        )
    }
}
