//! Catalog of built execution environments.
//!
//! Environments are scoped to an owner (or to the shared library when the
//! owner is NULL) and carry at most one language binding per owner at a
//! time. The exclusivity invariant is maintained transactionally: clearing
//! the old binding and setting the new one happen in a single transaction,
//! so an interruption cannot leave two environments bound to one language.

use crate::types::Environment;
use sqlx::SqlitePool;

const SELECT_COLUMNS: &str = "SELECT id, author_id, name, image, dockerfile, language FROM environments";

/// Values the store historically used to mark an unbound environment.
/// NULL is canonical on write; reads match all of them.
const UNBOUND_SENTINEL: &str = "none";

#[derive(Clone)]
pub struct EnvironmentRegistry {
    pool: SqlitePool,
}

impl EnvironmentRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The environment evaluating `language` snippets for `author_id`, if
    /// any. The requester's own binding wins; a library environment bound
    /// to the language is the fallback. Absence is not an error.
    pub async fn get_by_language(
        &self,
        author_id: &str,
        language: &str,
    ) -> Result<Option<Environment>, sqlx::Error> {
        let query = format!(
            "{SELECT_COLUMNS}
             WHERE (author_id = ?1 OR author_id IS NULL) AND language = ?2
             ORDER BY author_id IS NULL, id
             LIMIT 1"
        );
        sqlx::query_as::<_, Environment>(&query)
            .bind(author_id)
            .bind(language)
            .fetch_optional(&self.pool)
            .await
    }

    /// All environments visible to `author_id`: their own plus library
    /// ones, in stable id order.
    pub async fn list(&self, author_id: &str) -> Result<Vec<Environment>, sqlx::Error> {
        let query = format!(
            "{SELECT_COLUMNS}
             WHERE author_id = ?1 OR author_id IS NULL
             ORDER BY id"
        );
        sqlx::query_as::<_, Environment>(&query)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await
    }

    /// Looks `name` up in the set visible to `author_id`, preferring the
    /// requester's own environment when a library one shares the name.
    pub async fn find_by_name(
        &self,
        author_id: &str,
        name: &str,
    ) -> Result<Option<Environment>, sqlx::Error> {
        let query = format!(
            "{SELECT_COLUMNS}
             WHERE (author_id = ?1 OR author_id IS NULL) AND name = ?2
             ORDER BY author_id IS NULL, id
             LIMIT 1"
        );
        sqlx::query_as::<_, Environment>(&query)
            .bind(author_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    /// Rebinds `language` to the environment with id `env_id`, clearing the
    /// binding from every other environment of the same owner. Runs as one
    /// transaction; the exclusivity invariant holds even if interrupted.
    pub async fn rebind_language(
        &self,
        author_id: &str,
        language: &str,
        env_id: i64,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE environments SET language = NULL
             WHERE author_id = ?1 AND (language = ?2 OR language = ?3) AND id != ?4",
        )
        .bind(author_id)
        .bind(language)
        .bind(UNBOUND_SENTINEL)
        .bind(env_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE environments SET language = ?1 WHERE id = ?2")
            .bind(language)
            .bind(env_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }

    /// Records a successful build: inserts a new environment or replaces
    /// the image and build spec of the record keyed by `(author_id, name)`.
    ///
    /// A `language` of `None` preserves whatever binding the existing row
    /// carries; an explicit language overwrites it after clearing the
    /// owner's competing bindings. The upsert is spelled out manually
    /// because SQLite's UNIQUE treats NULL owners as distinct rows.
    pub async fn commit(
        &self,
        author_id: Option<&str>,
        name: &str,
        image: &str,
        dockerfile: &str,
        language: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(language) = language {
            sqlx::query(
                "UPDATE environments SET language = NULL
                 WHERE ((?1 IS NULL AND author_id IS NULL) OR author_id = ?1)
                   AND language = ?2 AND name != ?3",
            )
            .bind(author_id)
            .bind(language)
            .bind(name)
            .execute(&mut *tx)
            .await?;
        }

        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM environments
             WHERE ((?1 IS NULL AND author_id IS NULL) OR author_id = ?1) AND name = ?2",
        )
        .bind(author_id)
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?;

        match existing {
            Some((id,)) => {
                sqlx::query(
                    "UPDATE environments
                     SET image = ?1, dockerfile = ?2,
                         language = COALESCE(?3, language)
                     WHERE id = ?4",
                )
                .bind(image)
                .bind(dockerfile)
                .bind(language)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO environments (author_id, name, image, dockerfile, language)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .bind(author_id)
                .bind(name)
                .bind(image)
                .bind(dockerfile)
                .bind(language)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await
    }
}
