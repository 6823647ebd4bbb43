mod appointment;
mod cli;
mod config;
mod error;
mod gemini_client;

use std::fs;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use eyre::{Result, WrapErr, eyre};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use crate::appointment::{CsvRecordStore, KeywordDetector, RegexExtractor};
use crate::cli::chat::ChatContext;
use crate::cli::chat::controller::ConversationController;
use crate::cli::chat::display::TerminalDisplay;
use crate::config::{Config, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_RECORDS_FILE};
use crate::gemini_client::GeminiClient;

#[derive(Parser)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    chat: ChatArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session with DentalBot
    Chat(ChatArgs),
}

#[derive(Args, Clone)]
struct ChatArgs {
    /// Send a single message and exit
    #[arg(short, long)]
    input: Option<String>,

    /// Gemini model to talk to
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the Gemini API
    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// CSV file confirmed appointments are appended to
    #[arg(long, env = "DENTALBOT_RECORDS", default_value = DEFAULT_RECORDS_FILE)]
    records: String,

    /// File with a system prompt replacing the built-in one
    #[arg(long)]
    system_prompt: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) -> Result<()> {
    let log_level = if verbose { Level::DEBUG } else { Level::WARN };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eyre!("Failed to set tracing subscriber: {}", e))
}

fn build_config(args: &ChatArgs) -> Result<Config> {
    let system_prompt = match &args.system_prompt {
        Some(path) => Some(
            fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read system prompt from {}", path))?,
        ),
        None => None,
    };

    Ok(Config::new(
        args.model.clone(),
        args.api_base.clone(),
        &args.records,
        system_prompt,
    ))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    let args = match cli.command {
        Some(Commands::Chat(args)) => args,
        None => cli.chat,
    };

    init_tracing(args.verbose)?;
    info!("Starting DentalBot");

    let config = build_config(&args)?;
    debug!(
        "Using model {} with records at {}",
        config.model,
        config.records_path.display()
    );

    let controller = ConversationController::new(
        &config.system_prompt,
        Box::new(GeminiClient::new(&config)),
        Box::new(RegexExtractor::new()?),
        Box::new(KeywordDetector::default()),
        CsvRecordStore::new(config.records_path.clone()),
    );

    let stdout = io::stdout();
    let styled = stdout.is_terminal();
    let mut chat_context = ChatContext::new(
        Box::new(io::stdout()),
        Box::new(TerminalDisplay::new(stdout, styled)),
        args.input,
        true,
        controller,
    );
    chat_context.run().await
}
