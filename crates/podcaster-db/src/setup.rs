//! Database setup and initialization.
//!
//! Podcast jobs live in a single key-value table addressed by `(pk, sk)`
//! strings, with the record body as a JSON blob. Jobs use
//! `pk = "PODCAST#<id>"`, `sk = "METADATA"`; the extra indexed columns
//! exist only to serve the newest-first listing.

use anyhow::Result;
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::path::Path;

/// Sets up the `SQLite` database connection and ensures the schema exists.
///
/// Creates the database file (and parent directory) when missing; safe to
/// call repeatedly.
pub async fn setup_database(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePool::connect_with(
        SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true),
    )
    .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Sets up an in-memory `SQLite` database for testing.
#[cfg(any(test, feature = "test-utils"))]
pub async fn setup_test_database() -> Result<SqlitePool> {
    let pool = SqlitePool::connect("sqlite::memory:").await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Creates the schema. All statements use IF NOT EXISTS.
async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS podcast_items (
            pk TEXT NOT NULL,
            sk TEXT NOT NULL,
            payload TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (pk, sk)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Serves the reverse-chronological listing.
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_podcast_items_created_at \
         ON podcast_items(created_at DESC, pk DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
