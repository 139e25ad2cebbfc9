//! CLI module
//!
//! # Commands
//!
//! - `check` - Test connection to the API
//! - `streams` - List stream names in sync order
//! - `sync` - Extract all streams as JSON lines on stdout

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
