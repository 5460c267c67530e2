//! Error types for HashLedger nodes

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Request data was missing or malformed; chain state was not touched.
    InvalidPayload(String),
    InvalidStake(String),
    NoEligibleValidator,
    /// A freshly produced block did not link onto the live tip.
    InvalidBlockProduced(String),
    MiningFailed(String),
    InvalidBlock(String),
    InvalidChain(String),
    NetworkError(String),
    MalformedPeerResponse(String),
    IoError(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::InvalidPayload(msg) => write!(f, "Invalid payload: {}", msg),
            ChainError::InvalidStake(msg) => write!(f, "Invalid validator/amount: {}", msg),
            ChainError::NoEligibleValidator => write!(f, "No eligible validator"),
            ChainError::InvalidBlockProduced(msg) => write!(f, "Invalid block produced: {}", msg),
            ChainError::MiningFailed(msg) => write!(f, "Mining failed: {}", msg),
            ChainError::InvalidBlock(msg) => write!(f, "Invalid block: {}", msg),
            ChainError::InvalidChain(msg) => write!(f, "Invalid chain: {}", msg),
            ChainError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ChainError::MalformedPeerResponse(msg) => write!(f, "Malformed peer response: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChainError::MalformedPeerResponse(err.to_string())
        } else {
            ChainError::NetworkError(err.to_string())
        }
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
