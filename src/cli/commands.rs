//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sendbird extraction tap CLI
#[derive(Parser, Debug)]
#[command(name = "sendbird-tap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// State file (JSON); created on first sync
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON (no persistence)
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test connection to the API
    Check {
        /// Inline config JSON
        #[arg(long)]
        config_json: Option<String>,
    },

    /// List available stream names in sync order
    Streams,

    /// Sync all streams, emitting JSON lines on stdout
    Sync {
        /// Inline config JSON
        #[arg(long)]
        config_json: Option<String>,
    },
}
