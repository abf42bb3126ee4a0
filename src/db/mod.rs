//! Database access for the delivery record

pub mod uploads;

use crate::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize the delivery-record database connection pool.
///
/// Creates the parent directory and database file if missing. Failure here is
/// fatal to the run; nothing must be delivered without a durable record to
/// commit into.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the uploads table if it does not exist.
///
/// The unique index enforces at most one row per (artist, title),
/// case-insensitively, so a renamed copy of a delivered song can never gain a
/// second row.
async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS uploads (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            artist      TEXT NOT NULL,
            title       TEXT NOT NULL,
            source_path TEXT NOT NULL,
            uploaded_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_uploads_identity
        ON uploads (artist COLLATE NOCASE, title COLLATE NOCASE)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("Database tables initialized (uploads)");

    Ok(())
}
