//! Command-line handling shared by the node binaries

use crate::config::{load_config, parse_peer_list, Config, ConfigError};
use clap::Args;
use std::path::PathBuf;

/// Flags accepted by every node binary. Flags win over environment
/// variables, which win over the config file.
#[derive(Debug, Clone, Args)]
pub struct NodeArgs {
    /// Path to a TOML config file (defaults apply if it does not exist)
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,
    /// HTTP port to listen on
    #[arg(long)]
    pub port: Option<u16>,
    /// Comma-separated peer base URLs
    #[arg(long)]
    pub peers: Option<String>,
}

impl NodeArgs {
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = load_config(&self.config)?;
        self.apply_to(&mut config);
        Ok(config)
    }

    pub fn apply_to(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.node.api_port = Some(port);
        }
        if let Some(peers) = &self.peers {
            config.sync.peers = parse_peer_list(peers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeVariant;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        node: NodeArgs,
    }

    #[test]
    fn test_flags_override_config() {
        let cli = TestCli::parse_from(["node", "--port", "9100", "--peers", "http://a:1,http://b:2"]);
        let mut config = Config::default();
        cli.node.apply_to(&mut config);
        assert_eq!(config.api_port(NodeVariant::Peer), 9100);
        assert_eq!(config.sync.peers, vec!["http://a:1", "http://b:2"]);
    }

    #[test]
    fn test_defaults_leave_config_alone() {
        let cli = TestCli::parse_from(["node"]);
        assert_eq!(cli.node.config, PathBuf::from("config.toml"));
        let mut config = Config::default();
        cli.node.apply_to(&mut config);
        assert_eq!(config.api_port(NodeVariant::Work), 8081);
        assert!(config.sync.peers.is_empty());
    }
}
