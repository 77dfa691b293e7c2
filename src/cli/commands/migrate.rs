use crate::cli::utils::output_success;
use crate::cli::{require_persistent, OutputFormat};
use crate::config::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let database = &config().database;
    require_persistent(database)?;

    let pool = DatabaseManager::connect(database).await?;
    DatabaseManager::migrate(&pool).await?;
    output_success(&output_format, "Migrations applied", None)
}
