//! Per-user evaluation mode persistence.

use crate::types::Behavior;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct BehaviorStore {
    pool: SqlitePool,
    default: Behavior,
}

impl BehaviorStore {
    pub fn new(pool: SqlitePool, default: Behavior) -> Self {
        Self { pool, default }
    }

    /// Returns the persisted behavior for `author_id`. On first contact the
    /// configured default is persisted and returned, with the second tuple
    /// element set so the caller can issue its one-time advisory.
    pub async fn fetch_or_init(&self, author_id: &str) -> Result<(Behavior, bool), sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM behaviors WHERE author_id = ?1")
                .bind(author_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((raw,)) => {
                // A row written by an older deployment may hold a value the
                // enum no longer knows; fall back without rewriting it.
                let value = Behavior::parse(&raw).unwrap_or(self.default);
                Ok((value, false))
            }
            None => {
                sqlx::query("INSERT INTO behaviors (author_id, value) VALUES (?1, ?2)")
                    .bind(author_id)
                    .bind(self.default.as_str())
                    .execute(&self.pool)
                    .await?;
                Ok((self.default, true))
            }
        }
    }

    /// Persists `raw` for `author_id` if it names a known behavior;
    /// unknown values are a silent no-op.
    pub async fn set(&self, author_id: &str, raw: &str) -> Result<Option<Behavior>, sqlx::Error> {
        let Some(value) = Behavior::parse(raw) else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO behaviors (author_id, value) VALUES (?1, ?2)
             ON CONFLICT(author_id) DO UPDATE SET value = excluded.value",
        )
        .bind(author_id)
        .bind(value.as_str())
        .execute(&self.pool)
        .await?;

        Ok(Some(value))
    }
}
