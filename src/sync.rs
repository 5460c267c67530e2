//! Chain synchronization for HashLedger peer nodes
//!
//! Periodically pulls every configured peer's chain and adopts it when it is
//! valid and strictly longer than the local one (longest-valid-chain rule).
//! Peers are visited in configuration order; a later peer in the same cycle
//! may replace a chain adopted from an earlier one.

use crate::blockchain::{Block, BlockView, ValidatedChain};
use crate::error::ChainError;
use crate::node::SharedChain;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Source of remote chains. The HTTP implementation is [`HttpPeerClient`].
pub trait PeerClient: Send + Sync + 'static {
    fn fetch_chain<B: Block>(
        &self,
        peer: &str,
    ) -> impl Future<Output = Result<Vec<BlockView<B>>, ChainError>> + Send;
}

/// Largest `/chain` body accepted from a peer.
pub const DEFAULT_MAX_CHAIN_BODY_BYTES: usize = 16 * 1024 * 1024;

/// `GET {peer}/chain` with a per-request timeout and a response size cap.
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpPeerClient {
    pub fn new(request_timeout: Duration) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            max_body_bytes: DEFAULT_MAX_CHAIN_BODY_BYTES,
        })
    }

    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

fn oversized(limit: usize) -> ChainError {
    ChainError::MalformedPeerResponse(format!("chain body exceeds {} bytes", limit))
}

/// Reads the body chunk by chunk, giving up as soon as it passes `limit`.
async fn read_capped(mut response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ChainError> {
    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(oversized(limit));
    }
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(oversized(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

pub fn chain_url(peer: &str) -> String {
    format!("{}/chain", peer.trim_end_matches('/'))
}

impl PeerClient for HttpPeerClient {
    async fn fetch_chain<B: Block>(&self, peer: &str) -> Result<Vec<BlockView<B>>, ChainError> {
        let response = self.client.get(chain_url(peer)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::NetworkError(format!("peer answered {}", status)));
        }
        let body = read_capped(response, self.max_body_bytes).await?;
        serde_json::from_slice(&body).map_err(|e| ChainError::MalformedPeerResponse(e.to_string()))
    }
}

/// Result of one pull from one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PeerOutcome {
    /// Remote chain was valid and strictly longer; it replaced the local one.
    Adopted { previous_len: usize, new_len: usize },
    /// Remote chain was valid but not longer.
    Kept { local_len: usize, remote_len: usize },
    /// Unreachable peer, undecodable body or invalid chain.
    Discarded { reason: String },
}

/// Consecutive discarded pulls after which a peer is flagged unreliable.
pub const UNRELIABLE_AFTER_FAILURES: u32 = 3;

/// Per-peer sync information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerSyncInfo {
    pub peer: String,
    pub attempts: u64,
    pub adoptions: u64,
    pub consecutive_failures: u32,
    /// Set once a peer has failed several cycles in a row; cleared by the next success.
    pub unreliable: bool,
    pub last_outcome: Option<PeerOutcome>,
    pub last_attempt: Option<DateTime<Utc>>,
}

impl PeerSyncInfo {
    pub fn new(peer: impl Into<String>) -> Self {
        Self {
            peer: peer.into(),
            attempts: 0,
            adoptions: 0,
            consecutive_failures: 0,
            unreliable: false,
            last_outcome: None,
            last_attempt: None,
        }
    }

    fn record(&mut self, outcome: &PeerOutcome) {
        self.attempts += 1;
        self.last_attempt = Some(Utc::now());
        match outcome {
            PeerOutcome::Adopted { .. } => {
                self.adoptions += 1;
                self.consecutive_failures = 0;
            }
            PeerOutcome::Kept { .. } => self.consecutive_failures = 0,
            PeerOutcome::Discarded { .. } => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1)
            }
        }
        self.unreliable = self.consecutive_failures >= UNRELIABLE_AFTER_FAILURES;
        self.last_outcome = Some(outcome.clone());
    }
}

/// Shared view of per-peer statistics, read by the API's status route.
#[derive(Debug, Clone, Default)]
pub struct SyncStatus {
    peers: Arc<RwLock<Vec<PeerSyncInfo>>>,
}

impl SyncStatus {
    pub fn new(peers: &[String]) -> Self {
        Self {
            peers: Arc::new(RwLock::new(peers.iter().map(PeerSyncInfo::new).collect())),
        }
    }

    async fn record(&self, peer: &str, outcome: &PeerOutcome) {
        let mut peers = self.peers.write().await;
        match peers.iter_mut().find(|p| p.peer == peer) {
            Some(info) => info.record(outcome),
            None => {
                let mut info = PeerSyncInfo::new(peer);
                info.record(outcome);
                peers.push(info);
            }
        }
    }

    pub async fn snapshot(&self) -> Vec<PeerSyncInfo> {
        self.peers.read().await.clone()
    }
}

/// Pulls peers' chains into a shared local chain.
pub struct ChainSynchronizer<B: Block, C: PeerClient> {
    peers: Vec<String>,
    client: C,
    chain: SharedChain<B>,
    status: SyncStatus,
    interval: Duration,
}

impl<B: Block, C: PeerClient> ChainSynchronizer<B, C> {
    pub fn new(peers: Vec<String>, client: C, chain: SharedChain<B>, status: SyncStatus, interval: Duration) -> Self {
        Self {
            peers,
            client,
            chain,
            status,
            interval,
        }
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    /// One pass over every peer, in order.
    pub async fn sync_once(&self) -> Vec<(String, PeerOutcome)> {
        let mut outcomes = Vec::with_capacity(self.peers.len());
        for peer in &self.peers {
            let outcome = self.sync_peer(peer).await;
            match &outcome {
                PeerOutcome::Adopted { previous_len, new_len } => {
                    info!(peer = %peer, previous_len, new_len, "Adopted longer chain from peer");
                }
                PeerOutcome::Kept { local_len, remote_len } => {
                    debug!(peer = %peer, local_len, remote_len, "Kept local chain");
                }
                PeerOutcome::Discarded { reason } => {
                    warn!(peer = %peer, reason = %reason, "Discarded peer chain");
                }
            }
            self.status.record(peer, &outcome).await;
            outcomes.push((peer.clone(), outcome));
        }
        outcomes
    }

    async fn sync_peer(&self, peer: &str) -> PeerOutcome {
        let views = match self.client.fetch_chain::<B>(peer).await {
            Ok(views) => views,
            Err(e) => return PeerOutcome::Discarded { reason: e.to_string() },
        };

        // Full validation happens before the lock is taken.
        let candidate = match ValidatedChain::from_views(views) {
            Ok(candidate) => candidate,
            Err(e) => return PeerOutcome::Discarded { reason: e.to_string() },
        };
        let remote_len = candidate.len();

        let mut chain = self.chain.write().await;
        let local_len = chain.len();
        if chain.adopt_if_longer(candidate) {
            PeerOutcome::Adopted {
                previous_len: local_len,
                new_len: remote_len,
            }
        } else {
            PeerOutcome::Kept { local_len, remote_len }
        }
    }

    /// Runs `sync_once` every interval, starting one interval from now.
    pub async fn run(self) {
        info!(peers = self.peers.len(), interval_secs = self.interval.as_secs(), "Chain synchronizer started");
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.sync_once().await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
