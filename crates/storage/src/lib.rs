use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// A persisted value as last written under its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot {
    pub key: String,
    pub payload: String,
    pub updated_at: DateTime<Utc>,
}

/// Local key-value persistence for whole-value snapshots.
///
/// Every write replaces the previous value for the key; there is no
/// incremental update and no history.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load_snapshot(&self, key: &str) -> Result<Option<StoredSnapshot>>;
    async fn save_snapshot(&self, key: &str, payload: &str) -> Result<()>;
    /// Returns whether a snapshot existed for `key`.
    async fn clear_snapshot(&self, key: &str) -> Result<bool>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url '{database_url}'"))?
            .create_if_missing(true);
        // Each connection to an in-memory database gets its own empty database.
        let max_connections = if is_memory_url(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open sqlite database '{database_url}'"))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run snapshot migrations")?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for Storage {
    async fn load_snapshot(&self, key: &str) -> Result<Option<StoredSnapshot>> {
        let row = sqlx::query("SELECT key, payload, updated_at FROM snapshots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read snapshot '{key}'"))?;
        Ok(row.map(|r| StoredSnapshot {
            key: r.get::<String, _>(0),
            payload: r.get::<String, _>(1),
            updated_at: r.get::<DateTime<Utc>, _>(2),
        }))
    }

    async fn save_snapshot(&self, key: &str, payload: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO snapshots (key, payload, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write snapshot '{key}'"))?;
        debug!(key, bytes = payload.len(), "snapshot written");
        Ok(())
    }

    async fn clear_snapshot(&self, key: &str) -> Result<bool> {
        let removed = sqlx::query("DELETE FROM snapshots WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to clear snapshot '{key}'"))?
            .rows_affected();
        Ok(removed > 0)
    }
}

/// Turns a bare file path, or a `sqlite:` path, into a `sqlite://` URL. Anything
/// that already carries a scheme is passed through untouched.
pub fn sqlite_url(location: &str) -> String {
    let location = location.trim();
    if location.contains("://") || location.starts_with("sqlite::memory:") {
        return location.to_string();
    }
    let path = location.strip_prefix("sqlite:").unwrap_or(location);
    format!("sqlite://{}", path.replace('\\', "/"))
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
