//! SQLite-backed persistence for environments and behaviors.
//!
//! The store is the only state shared across concurrent requests. The
//! schema is created idempotently when the pool is opened, so a fresh
//! database file is usable immediately.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

pub mod behaviors;
pub mod environments;

pub use behaviors::BehaviorStore;
pub use environments::EnvironmentRegistry;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS behaviors (
        author_id TEXT PRIMARY KEY,
        value     TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS environments (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        author_id  TEXT,
        name       TEXT NOT NULL,
        image      TEXT NOT NULL,
        dockerfile TEXT NOT NULL,
        language   TEXT
    )",
];

/// Open (creating if missing) the database file and apply the schema.
pub async fn open<P: AsRef<Path>>(path: P) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path.as_ref())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

/// In-memory database for tests. Pinned to a single connection: each
/// SQLite `:memory:` connection is its own database.
pub async fn open_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    apply_schema(&pool).await?;
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
