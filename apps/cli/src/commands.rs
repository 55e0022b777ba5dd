//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use lexi_core::viewer::{self, DocumentView};
use lexi_core::{KnowledgeStore, Session, SessionHandle};
use lexi_shared::{AppConfig, Message, init_config, resolve_config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Lexi - ask legal questions, get cited answers.
#[derive(Parser)]
#[command(
    name = "lexi",
    version,
    about = "Ask legal questions and get answers backed by cited judgments.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.lexi/lexi.toml.
    #[arg(long, global = true, env = "LEXI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Ask a single question and print the answer.
    Ask {
        /// The question. Multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Print the assistant message as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Interactive chat on stdin.
    Chat,

    /// List the configured knowledge records.
    Records,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so answers stay clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "lexi=warn",
        1 => "lexi=info",
        2 => "lexi=debug",
        _ => "lexi=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Ask { query, json } => cmd_ask(config_path, &query.join(" "), json).await,
        Command::Chat => cmd_chat(config_path).await,
        Command::Records => cmd_records(config_path).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ask(config_path: Option<&Path>, query: &str, json: bool) -> Result<()> {
    let config = resolve_config(config_path)?;
    let (session, _task) = Session::from_config(&config)?;

    info!(query, "asking");
    let answer = ask_with_spinner(&session, query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        print_answer(&config, &answer);
    }
    Ok(())
}

async fn cmd_chat(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let (session, task) = Session::from_config(&config)?;
    let name = &config.assistant.name;

    println!();
    println!("  {name} Legal Assistant");
    println!("  {}", config.assistant.greeting);
    println!("  End a line with '\\' to continue it. /cite opens the last citation, /quit exits.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "you> " } else { "...> " };
        eprint!("{prompt}");

        let Some(line) = lines.next_line().await? else {
            break;
        };

        if let Some(continued) = line.strip_suffix('\\') {
            buffer.push_str(continued);
            buffer.push('\n');
            continue;
        }
        buffer.push_str(&line);
        let input = std::mem::take(&mut buffer);

        match input.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/cite" => {
                show_last_citation(&config, &session).await?;
                continue;
            }
            _ => {}
        }

        let answer = ask_with_spinner(&session, &input).await?;
        print_answer(&config, &answer);
    }

    drop(session);
    task.await.map_err(|e| eyre!("session task failed: {e}"))?;
    Ok(())
}

async fn cmd_records(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let store = KnowledgeStore::new(config.records)?;

    if store.is_empty() {
        println!("No knowledge records configured.");
        return Ok(());
    }

    println!();
    for (idx, record) in store.records().iter().enumerate() {
        println!("  [{idx}] keywords: {}", record.keywords.join(", "));
        println!("      answer:   {}", record.answer);
        println!("      citation: {}", record.citation.text);
        println!("      source:   {}", record.citation.link);
        println!();
    }
    println!("  {} record(s)", store.len());
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config: AppConfig = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// Ask through the session with a spinner covering the pacing delay.
async fn ask_with_spinner(session: &SessionHandle, query: &str) -> Result<Message> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message("Searching judgments...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let answer = session.ask(query).await;
    spinner.finish_and_clear();
    Ok(answer?)
}

fn print_answer(config: &AppConfig, answer: &Message) {
    println!();
    println!("  {}: {}", config.assistant.name, answer.content);
    for citation in &answer.citations {
        println!();
        println!("  Citation: {}", citation.text);
        println!("  Source:   {}", citation.link);
        if let Some(note) = &citation.note {
            println!("  📌 {note}");
        }
    }
    println!();
}

/// Open the newest citation through the session and print the document.
async fn show_last_citation(config: &AppConfig, session: &SessionHandle) -> Result<()> {
    let snapshot = session.snapshot();
    let Some(message) = snapshot
        .transcript
        .iter()
        .rev()
        .find(|m| !m.citations.is_empty())
    else {
        println!("  No citation yet.");
        return Ok(());
    };

    let mut rx = session.subscribe();
    let since = rx.borrow().revision;
    session.open_citation(message.id, 0)?;
    let view = rx
        .wait_for(|s| s.revision > since && s.document.is_some())
        .await?
        .document
        .clone()
        .ok_or_else(|| eyre!("citation did not open"))?;

    print_document(config, &view);
    session.close_document()?;
    Ok(())
}

fn print_document(config: &AppConfig, view: &DocumentView) {
    println!();
    println!("  {}", view.title);
    if let Some(note) = &view.note {
        println!("  📌 {note}");
    }
    println!("  {}", "-".repeat(60));

    let path = viewer::resolve_link(Path::new(&config.documents.root), &view.link);
    match viewer::load_document(&path) {
        Ok(text) => {
            for fragment in view.mark(&text) {
                let marker = if fragment.highlighted { ">>" } else { "  " };
                println!("  {marker} {}", fragment.text);
            }
        }
        Err(e) => {
            info!(error = %e, "document unavailable");
            println!("  Document unavailable at {}", path.display());
            if !view.highlights.is_empty() {
                println!("  Highlights: {}", view.highlights.join(" · "));
            }
        }
    }
    println!();
}
