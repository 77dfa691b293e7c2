pub mod commands;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::{config, DatabaseConfig, StorageBackend};
use crate::database::{DatabaseManager, Store};

#[derive(Parser)]
#[command(name = "kittens-admin")]
#[command(about = "Kitten Rating operator CLI - migrations, breeds and moderation")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply database migrations")]
    Migrate,

    #[command(about = "Breed catalogue management")]
    Breed {
        #[command(subcommand)]
        cmd: commands::breed::BreedCommands,
    },

    #[command(about = "Kitten moderation")]
    Kitten {
        #[command(subcommand)]
        cmd: commands::kitten::KittenCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Operator commands only make sense against a store that outlives the process
pub fn require_persistent(database: &DatabaseConfig) -> anyhow::Result<()> {
    if database.backend != StorageBackend::Postgres {
        anyhow::bail!(
            "kittens-admin needs the postgres backend; STORAGE_BACKEND={:?} keeps nothing after exit",
            database.backend
        );
    }
    Ok(())
}

/// Store configured for this environment, the same one the server opens
pub async fn open_store() -> anyhow::Result<Arc<dyn Store>> {
    let database = &config().database;
    require_persistent(database)?;
    Ok(DatabaseManager::open_store(database).await?)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Breed { cmd } => commands::breed::handle(cmd, output_format).await,
        Commands::Kitten { cmd } => commands::kitten::handle(cmd, output_format).await,
    }
}
