//! Sendbird tap CLI
//!
//! Command-line entry point for checking, listing, and syncing streams.

use clap::Parser;
use sendbird_tap::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    // Initialize logging to stderr; stdout is reserved for JSON lines
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
