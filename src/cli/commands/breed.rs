use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::{open_store, OutputFormat};

pub const BREED_NAME_MAX_LEN: usize = 100;

#[derive(Subcommand)]
pub enum BreedCommands {
    #[command(about = "List all breeds")]
    List,

    #[command(about = "Add a breed")]
    Add {
        #[arg(help = "Breed name (unique, at most 100 characters)")]
        name: String,
    },

    #[command(about = "Remove a breed and every kitten of that breed")]
    Remove {
        #[arg(help = "Breed id")]
        id: i64,
    },
}

/// Trimmed, non-empty breed name within the column limit
pub fn validate_breed_name(raw: &str) -> anyhow::Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        anyhow::bail!("Breed name may not be blank");
    }
    if name.chars().count() > BREED_NAME_MAX_LEN {
        anyhow::bail!("Breed name may not exceed {} characters", BREED_NAME_MAX_LEN);
    }
    Ok(name.to_string())
}

pub async fn handle(cmd: BreedCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store().await?;

    match cmd {
        BreedCommands::List => {
            let breeds = store.list_breeds().await?;
            if breeds.is_empty() {
                return output_empty_collection(&output_format, "breeds", "No breeds defined");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "breeds": breeds }))?);
                }
                OutputFormat::Text => {
                    println!("{:<8} {}", "ID", "NAME");
                    println!("{}", "-".repeat(40));
                    for breed in &breeds {
                        println!("{:<8} {}", breed.id, breed.name);
                    }
                }
            }
            Ok(())
        }
        BreedCommands::Add { name } => {
            let name = validate_breed_name(&name)?;
            let breed = store.create_breed(&name).await?;
            tracing::info!("Added breed {} ({})", breed.name, breed.id);
            output_success(
                &output_format,
                &format!("Added breed '{}' with id {}", breed.name, breed.id),
                Some(json!({ "breed": breed })),
            )
        }
        BreedCommands::Remove { id } => {
            if !store.delete_breed(id).await? {
                anyhow::bail!("Breed {} not found", id);
            }
            tracing::info!("Removed breed {}", id);
            output_success(&output_format, &format!("Removed breed {}", id), Some(json!({ "id": id })))
        }
    }
}
