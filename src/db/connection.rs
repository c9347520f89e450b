use std::{path::Path, time::Duration};

use anyhow::Context;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

use crate::config::DatabaseConfig;

const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Pooled connection used by the running server.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    open(cfg, cfg.max_connections, cfg.min_connections).await
}

/// Single-connection pool. Connection-scoped PRAGMAs (`foreign_keys`) only
/// hold when every statement runs on the same connection.
pub async fn connect_single(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    open(cfg, 1, 1).await
}

async fn open(
    cfg: &DatabaseConfig,
    max_connections: u32,
    min_connections: u32,
) -> anyhow::Result<DatabaseConnection> {
    ensure_parent_dir(&cfg.url)?;

    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(max_connections)
        .min_connections(min_connections.min(max_connections))
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_millis(cfg.acquire_timeout_ms))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {}", cfg.url))?;
    db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
    db.execute_unprepared(&format!("PRAGMA busy_timeout = {SQLITE_BUSY_TIMEOUT_MS}"))
        .await?;
    Ok(db)
}

fn ensure_parent_dir(url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_file_path(url) else {
        return Ok(());
    };
    let missing = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty() && !dir.exists());
    if let Some(parent) = missing {
        info!(dir = %parent.display(), "creating database directory");
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Filesystem path of a `sqlite:` URL, or `None` for in-memory databases.
pub fn sqlite_file_path(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(Path::new(path))
}
