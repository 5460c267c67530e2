use super::{require_payload, NodeInfo, SharedChain};
use crate::blockchain::{BlockView, Blockchain, PeerBlock};
use crate::config::{Config, NodeVariant};
use crate::error::ChainError;
use crate::sync::{ChainSynchronizer, PeerClient, PeerSyncInfo, SyncStatus};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info};

#[derive(Debug, Clone, Serialize)]
pub struct PeerInfo {
    pub peers: Vec<String>,
}

/// Peer-replicated node: appends on push and converges with peers through a
/// [`ChainSynchronizer`] sharing the same chain.
#[derive(Clone)]
pub struct PeerNode {
    name: String,
    chain: SharedChain<PeerBlock>,
    peers: Arc<Vec<String>>,
    status: SyncStatus,
}

impl PeerNode {
    pub fn new(name: impl Into<String>, genesis_payload: &str, peers: Vec<String>) -> Result<Self, ChainError> {
        let chain = Blockchain::new(PeerBlock::genesis(genesis_payload))?;
        let status = SyncStatus::new(&peers);
        Ok(Self {
            name: name.into(),
            chain: Arc::new(RwLock::new(chain)),
            peers: Arc::new(peers),
            status,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ChainError> {
        Self::new(
            config.node_name(NodeVariant::Peer),
            &config.node.genesis_payload,
            config.sync.peers.clone(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chain(&self) -> SharedChain<PeerBlock> {
        self.chain.clone()
    }

    /// Synchronizer bound to this node's chain and status.
    pub fn synchronizer<C: PeerClient>(&self, client: C, interval: Duration) -> ChainSynchronizer<PeerBlock, C> {
        ChainSynchronizer::new(
            self.peers.as_ref().clone(),
            client,
            self.chain.clone(),
            self.status.clone(),
            interval,
        )
    }

    pub async fn list_chain(&self) -> Vec<BlockView<PeerBlock>> {
        self.chain.read().await.views()
    }

    /// Builds and appends a successor of the tip in one critical section.
    pub async fn push(&self, payload: &str) -> Result<PeerBlock, ChainError> {
        let payload = require_payload(payload)?;
        let mut chain = self.chain.write().await;
        let block = PeerBlock::successor(chain.tip(), &payload);
        commit_pushed(&mut chain, block.clone())?;
        info!(height = block.height, hash = %block.hash, "Appended pushed block");
        Ok(block)
    }

    pub fn peers(&self) -> Vec<String> {
        self.peers.as_ref().clone()
    }

    pub async fn sync_status(&self) -> Vec<PeerSyncInfo> {
        self.status.snapshot().await
    }

    pub async fn info(&self) -> NodeInfo<PeerInfo> {
        let chain = self.chain.read().await;
        NodeInfo::from_chain(&self.name, &chain, PeerInfo { peers: self.peers() })
    }
}

/// Appends a freshly built block; a rejection here means the chain's own tip is inconsistent.
fn commit_pushed(chain: &mut Blockchain<PeerBlock>, block: PeerBlock) -> Result<(), ChainError> {
    chain.apply_block(block.clone()).map_err(|e| {
        error!(height = block.height, error = %e, "Pushed block rejected by chain");
        ChainError::InvalidBlockProduced(e.to_string())
    })
}
