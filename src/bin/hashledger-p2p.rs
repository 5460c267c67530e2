#![forbid(unsafe_code)]
//! Peer-synchronizing HashLedger node

use clap::Parser;
use colored::*;
use hashledger::api::{build_peer_router, run_api_server};
use hashledger::cli::NodeArgs;
use hashledger::config::NodeVariant;
use hashledger::node::PeerNode;
use hashledger::sync::HttpPeerClient;

#[derive(Parser)]
#[command(author, version, about = "Peer-synchronizing HashLedger node", long_about = None)]
struct Cli {
    #[command(flatten)]
    node: NodeArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = cli.node.load_config()?;

    let node = PeerNode::from_config(&config)?;
    let port = config.api_port(NodeVariant::Peer);

    println!("{}", node.name().bright_cyan().bold());
    println!("  {} http://0.0.0.0:{}", "API:".bright_green(), port);
    if node.peers().is_empty() {
        println!("  {} {}", "Peers:".bright_green(), "none".yellow());
    } else {
        println!("  {} {}", "Peers:".bright_green(), node.peers().join(", "));
    }

    let client = HttpPeerClient::new(config.sync.request_timeout())?;
    let sync_task = node.synchronizer(client, config.sync.interval()).spawn();

    let result = run_api_server(build_peer_router(node), port).await;
    sync_task.abort();
    result
}
