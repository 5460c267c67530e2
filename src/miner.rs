//! Proof-of-work mining
//!
//! The nonce search is a pure function of the previous block, the payload and
//! the difficulty. It holds no locks; callers commit the result separately.
//! A [`SearchControl`] lets a caller abandon a search (client went away, or a
//! deadline passed) without leaving a blocking thread spinning forever.

use crate::blockchain::{Block, WorkBlock};
use crate::error::ChainError;
use num_bigint::BigUint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Difficulty used when a request asks for something outside (0, 24].
pub const DEFAULT_DIFFICULTY: u32 = 18;
pub const MAX_REQUEST_DIFFICULTY: u32 = 24;

/// How many nonces are tried between checks of the cancel flag and deadline.
const CONTROL_CHECK_INTERVAL: u64 = 4096;

/// Request-boundary clamp for the difficulty parameter.
pub fn normalize_difficulty(requested: i64) -> u32 {
    match u32::try_from(requested) {
        Ok(d) if (1..=MAX_REQUEST_DIFFICULTY).contains(&d) => d,
        _ => DEFAULT_DIFFICULTY,
    }
}

/// `1 << (256 - difficulty)`. Zero for difficulties above 256, which no hash can meet.
pub fn target_for(difficulty: u32) -> BigUint {
    if difficulty > 256 {
        return BigUint::default();
    }
    BigUint::from(1u8) << (256 - difficulty) as usize
}

pub fn meets_target(block: &WorkBlock) -> bool {
    match hex::decode(&block.hash) {
        Ok(bytes) if bytes.len() == 32 => BigUint::from_bytes_be(&bytes) < target_for(block.difficulty),
        _ => false,
    }
}

/// Successor nonce; wraps to zero instead of overflowing so the search never gives up.
pub fn next_nonce(nonce: u64) -> u64 {
    if nonce == u64::MAX {
        warn!("Nonce space exhausted, restarting search from zero");
        0
    } else {
        nonce + 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchControl {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl SearchControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Guard that cancels the search when dropped.
    pub fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop {
            cancelled: self.cancelled.clone(),
        }
    }

    fn stop_reason(&self) -> Option<&'static str> {
        if self.is_cancelled() {
            Some("search cancelled")
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some("deadline exceeded")
        } else {
            None
        }
    }
}

pub struct CancelOnDrop {
    cancelled: Arc<AtomicBool>,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Brute-force nonce search for a successor of `previous`.
///
/// Every candidate gets a fresh timestamp. The returned block's hash, read as a
/// big-endian integer, is strictly below [`target_for`]`(difficulty)`.
pub fn search(
    previous: &WorkBlock,
    payload: &str,
    difficulty: u32,
    control: &SearchControl,
) -> Result<WorkBlock, ChainError> {
    let target = target_for(difficulty);
    let mut nonce: u64 = 0;
    let mut attempts: u64 = 0;

    loop {
        if attempts % CONTROL_CHECK_INTERVAL == 0 {
            if let Some(reason) = control.stop_reason() {
                return Err(ChainError::MiningFailed(format!(
                    "{} after {} attempts at difficulty {}",
                    reason, attempts, difficulty
                )));
            }
        }

        let mut candidate = WorkBlock::candidate(previous, payload, nonce, difficulty);
        let hash = candidate.digest_bytes();
        if BigUint::from_bytes_be(&hash) < target {
            candidate.hash = hex::encode(hash);
            info!(
                height = candidate.height,
                nonce = candidate.nonce,
                hash = %candidate.hash,
                "Mined new block"
            );
            return Ok(candidate);
        }

        nonce = next_nonce(nonce);
        attempts = attempts.wrapping_add(1);
    }
}

/// Search with no cancellation and no deadline.
pub fn mine_block(previous: &WorkBlock, payload: &str, difficulty: u32) -> Result<WorkBlock, ChainError> {
    search(previous, payload, difficulty, &SearchControl::new())
}
