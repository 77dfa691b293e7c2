use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{open_store, OutputFormat};

#[derive(Subcommand)]
pub enum KittenCommands {
    #[command(about = "Remove a kitten and its ratings, regardless of owner")]
    Remove {
        #[arg(help = "Kitten id")]
        id: i64,
    },
}

pub async fn handle(cmd: KittenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store().await?;

    match cmd {
        KittenCommands::Remove { id } => {
            let Some(kitten) = store.find_kitten(id).await? else {
                anyhow::bail!("Kitten {} not found", id);
            };
            store.delete_kitten(id).await?;
            tracing::info!("Removed kitten {} owned by {}", id, kitten.owner_username);
            output_success(
                &output_format,
                &format!("Removed kitten {} ({} {}, owner {})", id, kitten.color, kitten.breed_name, kitten.owner_username),
                Some(json!({ "id": id, "owner": kitten.owner_username })),
            )
        }
    }
}
