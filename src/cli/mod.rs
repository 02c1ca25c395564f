//! Command-line interface for sitebot.
//!
//! Provides commands for running the bot, checking a single message,
//! inspecting extraction and reference lookups, and showing configuration.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::adapters::TelegramTransport;
use crate::bot::Bot;
use crate::config::BotConfig;
use crate::core::{Pipeline, Reconciler};
use crate::domain::Reconciliation;
use crate::reference::CsvReferenceTable;
use crate::server;

/// sitebot - Site incident report checker for chat
#[derive(Parser, Debug)]
#[command(name = "sitebot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of discovering .sitebot/config.yaml
    #[arg(long = "config", global = true, env = "SITEBOT_CONFIG")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the chat bot and the keep-alive HTTP endpoint
    Serve {
        /// Keep-alive port (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Only run the keep-alive endpoint
        #[arg(long)]
        no_bot: bool,
    },

    /// Run one message through the full pipeline and print the reply
    Check {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the fields extracted from one message as JSON
    Extract {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Look an identifier pair up in the reference table
    Lookup {
        /// GP ID to look up
        #[arg(long)]
        gp_id: String,

        /// Seeker ID to look up
        #[arg(long)]
        seeker_id: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = match self.config_file {
            Some(ref path) => BotConfig::from_sources(Some(path), |key| std::env::var(key).ok())?,
            None => BotConfig::load()?,
        };

        match self.command {
            Commands::Serve { port, no_bot } => serve(config, port, no_bot).await,
            Commands::Check { input } => check_message(&config, input).await,
            Commands::Extract { input } => extract_message(&config, input).await,
            Commands::Lookup { gp_id, seeker_id } => lookup(&config, &gp_id, &seeker_id).await,
            Commands::Config => {
                println!("{}", config.describe());
                Ok(())
            }
        }
    }
}

/// Read a message from a file or stdin
fn read_input(input_file: Option<PathBuf>) -> Result<String> {
    let input = if let Some(path) = input_file {
        std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?
    } else if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    };

    Ok(input.trim().to_string())
}

/// Run the bot until Ctrl-C
async fn serve(config: BotConfig, port: Option<u16>, no_bot: bool) -> Result<()> {
    let port = port.unwrap_or(config.port);
    let server_task = tokio::spawn(server::serve(port));

    let telegram = if no_bot { None } else { config.telegram() };

    match telegram {
        Some(telegram) => {
            let pipeline = Arc::new(Pipeline::from_config(&config)?);
            let transport = Arc::new(TelegramTransport::new(telegram)?);
            let bot = Bot::new(transport, pipeline);

            tokio::select! {
                _ = bot.run(async {
                    let _ = tokio::signal::ctrl_c().await;
                }) => {}
                result = server_task => {
                    result.context("Keep-alive server task failed")??;
                }
            }
        }
        None => {
            if !no_bot {
                info!("TELEGRAM_BOT_TOKEN not set, running keep-alive endpoint only");
            }
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                result = server_task => {
                    result.context("Keep-alive server task failed")??;
                }
            }
        }
    }

    Ok(())
}

/// Run the full pipeline for one message
async fn check_message(config: &BotConfig, input: Option<PathBuf>) -> Result<()> {
    let message = read_input(input)?;
    let pipeline = Pipeline::from_config(config)?;

    match pipeline.reply(&message).await {
        Some(reply) => println!("{}", reply),
        None => eprintln!("[no reply]"),
    }

    Ok(())
}

/// Print the extraction result only
async fn extract_message(config: &BotConfig, input: Option<PathBuf>) -> Result<()> {
    let message = read_input(input)?;
    let pipeline = Pipeline::from_config(config)?;

    let extracted = pipeline
        .extractor()
        .extract(&message)
        .await
        .context("Extraction failed")?;

    println!("{}", serde_json::to_string_pretty(&extracted)?);
    Ok(())
}

/// Reconcile a bare identifier pair
async fn lookup(config: &BotConfig, gp_id: &str, seeker_id: &str) -> Result<()> {
    let table = CsvReferenceTable::new(config.reference_path.clone(), config.columns.clone());
    let reconciler = Reconciler::new(Arc::new(table));

    let result = reconciler
        .lookup(gp_id, seeker_id)
        .await
        .with_context(|| format!("Failed to read reference table {}", reconciler.source()))?;

    match result {
        Reconciliation::FullMatch { contact } => {
            println!("match (contact: {})", contact);
        }
        Reconciliation::MismatchSecondary => println!("GP ID found, Seeker ID not found"),
        Reconciliation::MismatchPrimary => println!("Seeker ID found, GP ID not found"),
        Reconciliation::NoMatch => println!("no match"),
    }

    Ok(())
}
