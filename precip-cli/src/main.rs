//! Binary crate for the `precip` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive token configuration
//! - Printing job envelopes as JSON

use clap::Parser;

mod cli;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging(logging::LogFormat::from_env());

    let cmd = cli::Cli::parse();
    cmd.run().await
}
