use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod commands;

#[derive(Parser)]
#[command(name = "aeroplan")]
#[command(about = "AEROPLAN - Knowledge-graph QA and assembly plan generation", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.config/aeroplan/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive question answering (default)
    Chat,
    /// Answer a single question and exit
    Ask {
        /// The question to ask
        question: String,
    },
    /// Delete stale graph visualizations
    Sweep,
    /// Show the most recently saved assembly plan
    Plans,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the answer stream
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = app::load_config(cli.config).await?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::run(config).await?,
        Commands::Ask { question } => commands::ask::run(config, question).await?,
        Commands::Sweep => commands::sweep::run(config).await?,
        Commands::Plans => commands::plans::run(config).await?,
    }

    Ok(())
}
