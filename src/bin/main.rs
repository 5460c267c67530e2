#![forbid(unsafe_code)]

use colored::*;

fn main() {
    println!("{}", "HashLedger".bright_cyan().bold());
    println!("{}", "----------".bright_cyan());
    println!();
    println!(
        "{}",
        "Each node variant is a separate binary.".yellow()
    );
    println!(
        "{}",
        "Use 'cargo run --bin <binary_name>' to start one.".yellow()
    );
    println!();
    println!("{}", "Available binaries:".bright_green().underline());
    println!("  - {}  {}", "hashledger-pow".bright_white(), "proof-of-work node (port 8081)".dimmed());
    println!("  - {}  {}", "hashledger-pos".bright_white(), "proof-of-stake node (port 8082)".dimmed());
    println!("  - {}  {}", "hashledger-p2p".bright_white(), "peer-synchronizing node (port 8090)".dimmed());
    println!();
    println!("{}", "Common flags:".bright_green().underline());
    println!("  --config <FILE>   TOML config file (default config.toml)");
    println!("  --port <PORT>     HTTP port (also PORT)");
    println!("  --peers <URLS>    comma-separated peer URLs (also PEERS)");
    println!();
    println!("{}", "Example:".bright_green().underline());
    println!("{}", "  PEERS=http://localhost:8090 cargo run --bin hashledger-p2p -- --port 8091".italic());
}
