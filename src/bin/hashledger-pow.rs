#![forbid(unsafe_code)]
//! Proof-of-work HashLedger node

use clap::Parser;
use colored::*;
use hashledger::api::{build_work_router, run_api_server};
use hashledger::cli::NodeArgs;
use hashledger::config::NodeVariant;
use hashledger::miner::DEFAULT_DIFFICULTY;
use hashledger::node::WorkNode;

#[derive(Parser)]
#[command(author, version, about = "Proof-of-work HashLedger node", long_about = None)]
struct Cli {
    #[command(flatten)]
    node: NodeArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = cli.node.load_config()?;

    let node = WorkNode::from_config(&config)?;
    let port = config.api_port(NodeVariant::Work);

    println!("{}", node.name().bright_cyan().bold());
    println!("  {} http://0.0.0.0:{}", "API:".bright_green(), port);
    println!("  {} {}", "Default difficulty:".bright_green(), DEFAULT_DIFFICULTY);

    run_api_server(build_work_router(node), port).await
}
