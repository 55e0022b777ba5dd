//! Lexi CLI - a keyword-matched legal assistant for the terminal.
//!
//! Answers questions from the configured knowledge records and cites the
//! judgment each answer comes from.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
