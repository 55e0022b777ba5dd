//! Lexi TUI - interactive terminal chat with the legal assistant.
//!
//! Shows the conversation transcript, accepts questions, and opens cited
//! judgments in an overlay, built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Lexi TUI - chat with the legal assistant in the terminal.
#[derive(Parser)]
#[command(name = "lexi-tui", version, long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.lexi/lexi.toml.
    #[arg(long, env = "LEXI_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    app::run(cli.config.as_deref())
}
