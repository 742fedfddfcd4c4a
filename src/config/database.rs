//! Database configuration for the transactions store.
//!
//! This module reads connection settings from the environment, opens the `SQLite`
//! connection pool through `SeaORM`, and creates the four tables from the entity
//! definitions. Tables are created with `IF NOT EXISTS` so bootstrapping an
//! existing database file is a no-op.

use crate::entities::{LineItem, Person, Product, Transaction};
use crate::errors::{Error, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/inventory.sqlite?mode=rwc";

/// Used when `DATABASE_MAX_CONNECTIONS` is not set.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection settings for the entity store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// `SeaORM` connection URL
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
}

impl DatabaseSettings {
    /// Reads `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`, falling back to defaults.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if `DATABASE_MAX_CONNECTIONS` is not a positive integer.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let max_connections = match std::env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => parse_max_connections(&raw)?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            url,
            max_connections,
        })
    }
}

fn parse_max_connections(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(Error::Config {
            message: format!("DATABASE_MAX_CONNECTIONS must be a positive integer, got {raw:?}"),
        }),
    }
}

/// File path of an on-disk `SQLite` URL, without the query string.
/// None for in-memory databases and other backends.
fn sqlite_file_path(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

/// Opens the connection pool described by `settings`.
///
/// For an on-disk `SQLite` database the parent directory is created first.
pub async fn create_connection(settings: &DatabaseSettings) -> Result<DatabaseConnection> {
    if let Some(parent) = sqlite_file_path(&settings.url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    debug!("Connecting to database at {}", settings.url);
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .sqlx_logging(false);

    Database::connect(options).await.map_err(Into::into)
}

/// Creates all tables using `SeaORM`'s schema generation from entity definitions.
///
/// Order matters: referenced tables are created before the tables holding the
/// foreign keys (persons and products, then transactions, then line items).
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Person).await?;
    create_table(db, &schema, Product).await?;
    create_table(db, &schema, Transaction).await?;
    create_table(db, &schema, LineItem).await?;

    info!("Database tables ensured");
    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}
