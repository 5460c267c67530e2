//! Configuration management for HashLedger nodes

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which block-production strategy a node runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeVariant {
    Work,
    Stake,
    Peer,
}

impl NodeVariant {
    pub fn default_name(self) -> &'static str {
        match self {
            NodeVariant::Work => "HashLedger PoW",
            NodeVariant::Stake => "HashLedger PoS",
            NodeVariant::Peer => "HashLedger P2P",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            NodeVariant::Work => 8081,
            NodeVariant::Stake => 8082,
            NodeVariant::Peer => 8090,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub node: NodeConfig,
    pub mining: MiningConfig,
    pub staking: StakingConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Falls back to the variant's name when unset.
    pub name: Option<String>,
    pub api_port: Option<u16>,
    pub genesis_payload: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: None,
            api_port: None,
            genesis_payload: default_genesis_payload(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Upper bound on a single nonce search. 0 means unbounded.
    pub timeout_secs: u64,
}

impl MiningConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    pub genesis_validator: String,
    /// Initial stake credited to the genesis validator. 0 leaves the ledger empty.
    pub genesis_stake: u64,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            genesis_validator: "genesis".to_string(),
            genesis_stake: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub peers: Vec<String>,
    pub interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            peers: Vec::new(),
            interval_secs: default_sync_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_genesis_payload() -> String {
    "Genesis".to_string()
}

fn default_sync_interval() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    3
}

/// Splits a comma-separated peer list, dropping blanks.
pub fn parse_peer_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn node_name(&self, variant: NodeVariant) -> String {
        self.node
            .name
            .clone()
            .unwrap_or_else(|| variant.default_name().to_string())
    }

    pub fn api_port(&self, variant: NodeVariant) -> u16 {
        self.node.api_port.unwrap_or_else(|| variant.default_port())
    }

    /// Applies `PORT` and `PEERS` overrides from `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::Invalid(format!("PORT={} is not a port: {}", port, e)))?;
            self.node.api_port = Some(port);
        }
        if let Some(peers) = lookup("PEERS") {
            let peers = parse_peer_list(&peers);
            if !peers.is_empty() {
                self.sync.peers = peers;
            }
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.node.genesis_payload.trim().is_empty() {
            return Err(ConfigError::Invalid("node.genesis_payload must not be empty".to_string()));
        }
        if self.staking.genesis_validator.trim().is_empty() {
            return Err(ConfigError::Invalid("staking.genesis_validator must not be empty".to_string()));
        }
        if self.sync.interval_secs == 0 {
            return Err(ConfigError::Invalid("sync.interval_secs must be positive".to_string()));
        }
        if self.sync.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("sync.request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Loads `path` (defaults when the file is absent) and applies environment overrides.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut config = if path.exists() {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Config::from_toml(&source)?
    } else {
        Config::default()
    };

    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.node_name(NodeVariant::Work), "HashLedger PoW");
        assert_eq!(config.api_port(NodeVariant::Stake), 8082);
        assert_eq!(config.api_port(NodeVariant::Peer), 8090);
        assert_eq!(config.node.genesis_payload, "Genesis");
        assert_eq!(config.staking.genesis_stake, 1);
        assert_eq!(config.sync.interval(), Duration::from_secs(5));
        assert_eq!(config.mining.timeout(), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [node]
            name = "alpha"

            [sync]
            peers = ["http://localhost:8091"]
            "#,
        )
        .unwrap();
        assert_eq!(config.node_name(NodeVariant::Peer), "alpha");
        assert_eq!(config.api_port(NodeVariant::Peer), 8090);
        assert_eq!(config.sync.peers, vec!["http://localhost:8091"]);
        assert_eq!(config.sync.request_timeout_secs, 3);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = Config::from_toml("[sync]\ninterval_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([("PORT", "9000"), ("PEERS", " http://a:1 , ,http://b:2/ ")]);
        let mut config = Config::default();
        config
            .apply_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_port(NodeVariant::Work), 9000);
        assert_eq!(config.sync.peers, vec!["http://a:1", "http://b:2/"]);
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(|k| (k == "PORT").then(|| "not-a-port".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mining]\ntimeout_secs = 30").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.mining.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.node.genesis_payload, "Genesis");
    }
}
