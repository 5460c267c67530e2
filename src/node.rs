//! Node handles
//!
//! Each node variant owns its ledger behind a single `tokio::sync::RwLock`.
//! Readers (chain listing, info, stake queries) share the lock; every
//! mutation (append, stake deposit, wholesale replacement by the
//! synchronizer) takes it exclusively. Handles are cheap to clone and are
//! passed into the API layer and the synchronizer rather than kept in globals.

pub mod peer;
pub mod stake;
pub mod work;

pub use peer::{PeerInfo, PeerNode};
pub use stake::{StakeInfo, StakeNode, StakeState};
pub use work::{WorkInfo, WorkNode};

use crate::blockchain::{Block, Blockchain};
use crate::error::ChainError;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type SharedChain<B> = Arc<RwLock<Blockchain<B>>>;

/// Summary returned by every node's `info` operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo<E> {
    pub name: String,
    pub blocks: usize,
    pub last_hash: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub extras: E,
}

impl<E> NodeInfo<E> {
    fn from_chain<B: Block>(name: &str, chain: &Blockchain<B>, extras: E) -> Self {
        Self {
            name: name.to_string(),
            blocks: chain.len(),
            last_hash: chain.tip().hash().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            extras,
        }
    }
}

/// Rejects blank payloads before any chain state is touched.
pub(crate) fn require_payload(payload: &str) -> Result<String, ChainError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(ChainError::InvalidPayload("data is required".to_string()));
    }
    Ok(payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_payload() {
        assert_eq!(require_payload("  A ").unwrap(), "A");
        assert!(matches!(require_payload(""), Err(ChainError::InvalidPayload(_))));
        assert!(matches!(require_payload(" \n\t"), Err(ChainError::InvalidPayload(_))));
    }
}
