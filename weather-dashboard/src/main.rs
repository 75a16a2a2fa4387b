//! Binary crate for the weather dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and layering them over file/environment configuration
//! - Serving the dashboard page and its JSON API
//! - Interactive configuration and one-shot lookups

use clap::Parser;

mod cli;
mod logging;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
