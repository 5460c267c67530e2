use chrono::{TimeZone, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Debug;

pub type Sha256Hash = [u8; 32];

/// Common shape shared by every block variant.
///
/// The digest of a block is SHA-256 over [`Block::canonical_record`], hex
/// encoded. Each variant fixes its own field order in that record; the order
/// must never change once blocks exist on the wire.
pub trait Block: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn height(&self) -> u64;
    fn timestamp(&self) -> i64;
    fn payload(&self) -> &str;
    fn previous_hash(&self) -> &str;
    fn hash(&self) -> &str;
    fn set_hash(&mut self, hash: String);

    /// Ordered concatenation of every field except `hash`.
    fn canonical_record(&self) -> String;

    fn digest_bytes(&self) -> Sha256Hash {
        Sha256::digest(self.canonical_record().as_bytes()).into()
    }

    fn digest(&self) -> String {
        hex::encode(self.digest_bytes())
    }

    /// Recomputes and stores the digest. Used when a block is finalized.
    fn seal(mut self) -> Self {
        let hash = self.digest();
        self.set_hash(hash);
        self
    }
}

/// Hex-encoded SHA-256 of an arbitrary string.
pub fn hash_record(record: &str) -> String {
    hex::encode(Sha256::digest(record.as_bytes()))
}

pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// RFC 3339 rendering of a block timestamp, empty when out of range.
pub fn format_timestamp(timestamp: i64) -> String {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_default()
}

// ============================================================================
// Proof-of-work block
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkBlock {
    pub height: u64,
    pub timestamp: i64,
    #[serde(rename = "data")]
    pub payload: String,
    pub nonce: u64,
    pub hash: String,
    #[serde(rename = "prevHash")]
    pub previous_hash: String,
    pub difficulty: u32,
}

impl WorkBlock {
    pub fn genesis(payload: &str) -> Self {
        WorkBlock {
            height: 0,
            timestamp: now_timestamp(),
            payload: payload.to_string(),
            nonce: 0,
            hash: String::new(),
            previous_hash: String::new(),
            difficulty: 1,
        }
        .seal()
    }

    /// Unsealed successor of `previous` with a fresh timestamp.
    pub fn candidate(previous: &WorkBlock, payload: &str, nonce: u64, difficulty: u32) -> Self {
        WorkBlock {
            height: previous.height + 1,
            timestamp: now_timestamp(),
            payload: payload.to_string(),
            nonce,
            hash: String::new(),
            previous_hash: previous.hash.clone(),
            difficulty,
        }
    }
}

impl Block for WorkBlock {
    fn height(&self) -> u64 {
        self.height
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn payload(&self) -> &str {
        &self.payload
    }

    fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    fn hash(&self) -> &str {
        &self.hash
    }

    fn set_hash(&mut self, hash: String) {
        self.hash = hash;
    }

    fn canonical_record(&self) -> String {
        format!(
            "{}{}{}{}{}{}",
            self.height, self.timestamp, self.payload, self.nonce, self.previous_hash, self.difficulty
        )
    }
}

// ============================================================================
// Proof-of-stake block
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeBlock {
    pub height: u64,
    pub timestamp: i64,
    #[serde(rename = "data")]
    pub payload: String,
    #[serde(rename = "validator")]
    pub validator_id: String,
    pub hash: String,
    #[serde(rename = "prevHash")]
    pub previous_hash: String,
}

impl StakeBlock {
    pub fn genesis(payload: &str, validator_id: &str) -> Self {
        StakeBlock {
            height: 0,
            timestamp: now_timestamp(),
            payload: payload.to_string(),
            validator_id: validator_id.to_string(),
            hash: String::new(),
            previous_hash: String::new(),
        }
        .seal()
    }

    /// Sealed successor of `previous` produced by `validator_id`.
    pub fn successor(previous: &StakeBlock, payload: &str, validator_id: &str) -> Self {
        StakeBlock {
            height: previous.height + 1,
            timestamp: now_timestamp(),
            payload: payload.to_string(),
            validator_id: validator_id.to_string(),
            hash: String::new(),
            previous_hash: previous.hash.clone(),
        }
        .seal()
    }
}

impl Block for StakeBlock {
    fn height(&self) -> u64 {
        self.height
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn payload(&self) -> &str {
        &self.payload
    }

    fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    fn hash(&self) -> &str {
        &self.hash
    }

    fn set_hash(&mut self, hash: String) {
        self.hash = hash;
    }

    fn canonical_record(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.height, self.timestamp, self.payload, self.validator_id, self.previous_hash
        )
    }
}

// ============================================================================
// Peer-synchronized block
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerBlock {
    pub height: u64,
    pub timestamp: i64,
    #[serde(rename = "data")]
    pub payload: String,
    pub hash: String,
    #[serde(rename = "prevHash")]
    pub previous_hash: String,
}

impl PeerBlock {
    pub fn genesis(payload: &str) -> Self {
        PeerBlock {
            height: 0,
            timestamp: now_timestamp(),
            payload: payload.to_string(),
            hash: String::new(),
            previous_hash: String::new(),
        }
        .seal()
    }

    pub fn successor(previous: &PeerBlock, payload: &str) -> Self {
        PeerBlock {
            height: previous.height + 1,
            timestamp: now_timestamp(),
            payload: payload.to_string(),
            hash: String::new(),
            previous_hash: previous.hash.clone(),
        }
        .seal()
    }
}

impl Block for PeerBlock {
    fn height(&self) -> u64 {
        self.height
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn payload(&self) -> &str {
        &self.payload
    }

    fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    fn hash(&self) -> &str {
        &self.hash
    }

    fn set_hash(&mut self, hash: String) {
        self.hash = hash;
    }

    fn canonical_record(&self) -> String {
        format!("{}{}{}{}", self.height, self.timestamp, self.payload, self.previous_hash)
    }
}
