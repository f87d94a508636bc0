use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    session_context, CheckCommand, ConfigCommand, ListCommand, SearchCommand, WatchCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "fridge")]
#[command(version)]
#[command(about = "Track what is in the fridge and what expires next", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Use an empty in-memory database instead of the remote one
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the fridge for expiring items
    Check(CheckCommand),

    /// Watch the fridge and notify on changes
    Watch(WatchCommand),

    /// Look up foods in the food database
    Search(SearchCommand),

    /// Print the fridge or the grocery list
    List(ListCommand),

    /// Show configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fridge=info,fridge_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Check(cmd)) => {
            cmd.run(session_context(&config, cli.offline)?).await?;
        }
        Some(Commands::Watch(cmd)) => {
            cmd.run(session_context(&config, cli.offline)?).await?;
        }
        Some(Commands::Search(cmd)) => {
            cmd.run(session_context(&config, cli.offline)?).await?;
        }
        Some(Commands::List(cmd)) => {
            cmd.run(session_context(&config, cli.offline)?).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
