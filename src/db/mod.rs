//! Database module for SQLite persistence.
//!
//! SQLite holds the member and task tables; everything else is derived.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::SeedData;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            revision_id INTEGER NOT NULL DEFAULT 0,
            generated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT OR IGNORE INTO meta (id, schema_version, revision_id, generated_at)
        VALUES (1, 1, 0, datetime('now'));
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT,
            skills TEXT,
            availability TEXT NOT NULL DEFAULT 'available',
            is_out_of_office INTEGER NOT NULL DEFAULT 0,
            source TEXT NOT NULL DEFAULT 'default',
            manual_override_active INTEGER NOT NULL DEFAULT 0,
            slack_ooo_from TEXT,
            slack_ooo_until TEXT,
            slack_pending_until TEXT,
            calendar_free_pct REAL NOT NULL DEFAULT 100,
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            project_name TEXT,
            priority TEXT NOT NULL,
            deadline TEXT NOT NULL,
            assignee_id TEXT,
            status TEXT NOT NULL,
            needs_rescoring INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skill_scores (
            task_id TEXT NOT NULL,
            member_id TEXT NOT NULL,
            skill_match_pct REAL NOT NULL,
            context_reason TEXT,
            PRIMARY KEY (task_id, member_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_members_name ON members(name);
        CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
        CREATE INDEX IF NOT EXISTS idx_tasks_deadline ON tasks(deadline);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a roster seed file when the member table is still empty.
///
/// Returns the number of members inserted.
pub async fn seed_if_empty(repo: &Repository, seed_path: &Path) -> Result<usize, AppError> {
    if !repo.list_members().await?.is_empty() {
        tracing::info!("Member table not empty, skipping seed {:?}", seed_path);
        return Ok(0);
    }

    let raw = tokio::fs::read_to_string(seed_path).await.map_err(|e| {
        AppError::Internal(format!("Failed to read seed file {:?}: {}", seed_path, e))
    })?;
    let seed: SeedData = serde_json::from_str(&raw)?;

    repo.seed(&seed).await?;
    Ok(seed.members.len())
}
