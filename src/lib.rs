//! HashLedger - hash-linked ledger nodes
//!
//! # Architecture
//!
//! ## Core Blockchain
//! - [`blockchain`] - Block types, chain container, validation, stake ledger
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work nonce search
//! - [`consensus`] - Stake-weighted validator selection
//!
//! ## Nodes & Networking
//! - [`node`] - Per-variant node handles over a locked chain
//! - [`sync`] - Longest-valid-chain synchronization with peers
//! - [`api`] - HTTP routers for the three node variants
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`cli`] - Flags shared by the node binaries
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Blockchain
// ============================================================================
pub mod blockchain;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod consensus;
pub mod miner;

// ============================================================================
// Nodes & Networking
// ============================================================================
pub mod node;
pub mod sync;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;
