#![forbid(unsafe_code)]
//! Proof-of-stake HashLedger node

use clap::Parser;
use colored::*;
use hashledger::api::{build_stake_router, run_api_server};
use hashledger::cli::NodeArgs;
use hashledger::config::NodeVariant;
use hashledger::node::StakeNode;

#[derive(Parser)]
#[command(author, version, about = "Proof-of-stake HashLedger node", long_about = None)]
struct Cli {
    #[command(flatten)]
    node: NodeArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = cli.node.load_config()?;

    let node = StakeNode::from_config(&config)?;
    let port = config.api_port(NodeVariant::Stake);

    println!("{}", node.name().bright_cyan().bold());
    println!("  {} http://0.0.0.0:{}", "API:".bright_green(), port);
    println!(
        "  {} {} (stake {})",
        "Genesis validator:".bright_green(),
        config.staking.genesis_validator,
        config.staking.genesis_stake
    );

    run_api_server(build_stake_router(node), port).await
}
