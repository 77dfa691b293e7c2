use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, StorageBackend};
use crate::database::repository::{constraint, Store};
use crate::database::{MemoryStore, PgStore};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated on {field}: {message}")]
    UniqueViolation { field: String, message: String },

    #[error("Foreign key violated on {field}")]
    ForeignKeyViolation { field: String },

    #[error("Check constraint violated on {field}: {message}")]
    CheckViolation { field: String, message: String },

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    /// Unique violation for a known constraint, worded the way clients see it
    pub fn unique(constraint_name: &str) -> Self {
        let (field, message) = match constraint_name {
            constraint::USERNAME_UNIQUE => ("username", "A user with that username already exists."),
            constraint::BREED_NAME_UNIQUE => ("name", "breed with this name already exists."),
            constraint::RATING_PAIR_UNIQUE => ("non_field_errors", "The fields user, kitten must make a unique set."),
            _ => ("non_field_errors", "Duplicate value."),
        };
        DatabaseError::UniqueViolation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Foreign key violation for a known constraint, keyed by the API field name
    pub fn foreign_key(constraint_name: &str) -> Self {
        let field = match constraint_name {
            constraint::KITTEN_OWNER_FK => "owner",
            constraint::KITTEN_BREED_FK => "breed_id",
            constraint::RATING_USER_FK => "user",
            constraint::RATING_KITTEN_FK => "kitten",
            _ => "non_field_errors",
        };
        DatabaseError::ForeignKeyViolation { field: field.to_string() }
    }

    /// Check violation for a known constraint, keyed by the API field name
    pub fn check(constraint_name: &str) -> Self {
        let (field, message) = match constraint_name {
            constraint::KITTEN_AGE_CHECK => ("age", "Ensure this value is greater than or equal to 0."),
            constraint::RATING_SCORE_CHECK => ("score", "Ensure this value is greater than or equal to 0."),
            _ => ("non_field_errors", "Invalid value."),
        };
        DatabaseError::CheckViolation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

// Classify constraint failures so handlers can answer with field errors
impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint_name = db_err.constraint().unwrap_or_default().to_string();
            match db_err.code().as_deref() {
                Some("23505") => return DatabaseError::unique(&constraint_name),
                Some("23503") => return DatabaseError::foreign_key(&constraint_name),
                Some("23514") => return DatabaseError::check(&constraint_name),
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Builds the configured store: connection pool, migrations and breed seeding
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
        let store: Arc<dyn Store> = match config.backend {
            StorageBackend::Memory => {
                warn!("Using in-memory store; all data is lost on shutdown");
                Arc::new(MemoryStore::new())
            }
            StorageBackend::Postgres => {
                let pool = Self::connect(config).await?;
                if config.run_migrations {
                    Self::migrate(&pool).await?;
                }
                Arc::new(PgStore::new(pool))
            }
        };

        Self::seed_breeds(store.as_ref(), &config.seed_breeds).await?;
        Ok(store)
    }

    /// Connect a PostgreSQL pool from `DATABASE_URL`
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let redacted = Self::redact_url(url)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected database pool: {}", redacted);
        Ok(pool)
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Insert any configured breed that does not exist yet
    pub async fn seed_breeds(store: &dyn Store, names: &[String]) -> Result<(), DatabaseError> {
        if names.is_empty() {
            return Ok(());
        }

        let existing = store.list_breeds().await?;
        for name in names {
            if existing.iter().any(|b| &b.name == name) {
                continue;
            }
            match store.create_breed(name).await {
                Ok(breed) => info!("Seeded breed '{}' (id {})", breed.name, breed.id),
                // Another instance may have seeded it concurrently
                Err(DatabaseError::UniqueViolation { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Connection string with the password masked, for logging
    fn redact_url(raw: &str) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***"))
                .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
