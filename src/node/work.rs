use super::{require_payload, NodeInfo, SharedChain};
use crate::blockchain::{BlockView, Blockchain, WorkBlock};
use crate::config::{Config, MiningConfig, NodeVariant};
use crate::error::ChainError;
use crate::miner::{self, normalize_difficulty, SearchControl, DEFAULT_DIFFICULTY};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkInfo {
    pub default_difficulty: u32,
    pub blocks_mined: u64,
}

/// Proof-of-work node.
#[derive(Clone)]
pub struct WorkNode {
    name: String,
    chain: SharedChain<WorkBlock>,
    mining: MiningConfig,
    blocks_mined: Arc<AtomicU64>,
}

impl WorkNode {
    pub fn new(name: impl Into<String>, genesis_payload: &str, mining: MiningConfig) -> Result<Self, ChainError> {
        let chain = Blockchain::new(WorkBlock::genesis(genesis_payload))?;
        Ok(Self {
            name: name.into(),
            chain: Arc::new(RwLock::new(chain)),
            mining,
            blocks_mined: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ChainError> {
        Self::new(
            config.node_name(NodeVariant::Work),
            &config.node.genesis_payload,
            config.mining.clone(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chain(&self) -> SharedChain<WorkBlock> {
        self.chain.clone()
    }

    pub fn blocks_mined(&self) -> u64 {
        self.blocks_mined.load(Ordering::Relaxed)
    }

    pub async fn list_chain(&self) -> Vec<BlockView<WorkBlock>> {
        self.chain.read().await.views()
    }

    /// Mines a block on top of the current tip and appends it.
    ///
    /// The tip is read once under a short read lock; the nonce search runs on
    /// the blocking pool with no lock held. If this future is dropped the
    /// search is cancelled.
    pub async fn mine(&self, payload: &str, requested_difficulty: i64) -> Result<WorkBlock, ChainError> {
        let payload = require_payload(payload)?;
        let difficulty = normalize_difficulty(requested_difficulty);
        let previous = self.chain.read().await.tip().clone();

        let control = match self.mining.timeout() {
            Some(timeout) => SearchControl::with_timeout(timeout),
            None => SearchControl::new(),
        };
        let _cancel_guard = control.cancel_on_drop();

        info!(height = previous.height + 1, difficulty, "Starting nonce search");
        let mined = tokio::task::spawn_blocking(move || miner::search(&previous, &payload, difficulty, &control))
            .await
            .map_err(|e| ChainError::MiningFailed(format!("mining task failed: {}", e)))??;

        self.commit(mined).await
    }

    /// Appends a mined block after re-validating it against the live tip.
    async fn commit(&self, block: WorkBlock) -> Result<WorkBlock, ChainError> {
        let mut chain = self.chain.write().await;
        if let Err(e) = chain.apply_block(block.clone()) {
            error!(
                height = block.height,
                tip = chain.tip().height,
                error = %e,
                "Mined block no longer extends the tip"
            );
            return Err(ChainError::InvalidBlockProduced(e.to_string()));
        }
        self.blocks_mined.fetch_add(1, Ordering::SeqCst);
        Ok(block)
    }

    pub async fn info(&self) -> NodeInfo<WorkInfo> {
        let chain = self.chain.read().await;
        NodeInfo::from_chain(
            &self.name,
            &chain,
            WorkInfo {
                default_difficulty: DEFAULT_DIFFICULTY,
                blocks_mined: self.blocks_mined(),
            },
        )
    }
}
