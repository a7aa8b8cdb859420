//! Token handoff node binary.
//!
//! Runs one initiator, one relay and one ledger in-process and logs how the
//! token handoff ends.

use tracing_subscriber::EnvFilter;

use handoff_node::cli::Cli;
use handoff_node::config::NodeConfig;
use handoff_node::Node;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::info!("Handoff Node v{}", env!("CARGO_PKG_VERSION"));

    // Build configuration
    let config = NodeConfig::from_cli(&cli);

    // Create and run node
    let node = Node::new(config)?;
    let report = node.run().await?;
    tracing::info!(outcome = %report.outcome, "Done");

    Ok(())
}
