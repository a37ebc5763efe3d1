use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::{path::PathBuf, time::Duration};
use tokio::fs;

use crate::config::AppConfig;

/// Create a SeaORM connection pool sized from the config and make sure it answers.
pub async fn create_orm_conn(config: &AppConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections.min(config.db_max_connections))
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(120))
        .sqlx_logging(false);

    let conn = Database::connect(options).await?;
    conn.ping().await?;
    Ok(conn)
}

/// Connect with a bounded number of attempts and a fixed delay between them.
pub async fn connect_with_retry(config: &AppConfig) -> Result<DatabaseConnection> {
    let attempts = config.db_connect_attempts.max(1);
    let mut attempt = 1;
    loop {
        tracing::info!(attempt, attempts, "connecting to database");
        match create_orm_conn(config).await {
            Ok(conn) => {
                tracing::info!("database connection established");
                return Ok(conn);
            }
            Err(err) if attempt < attempts => {
                tracing::warn!(
                    error = %err,
                    attempt,
                    retry_in_secs = config.db_connect_retry_delay.as_secs(),
                    "database connection failed"
                );
                tokio::time::sleep(config.db_connect_retry_delay).await;
                attempt += 1;
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("could not connect to database after {attempts} attempts")
                });
            }
        }
    }
}

/// Minimal migration runner that executes SQL files in `migrations/` in filename order.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    let mut entries = fs::read_dir("migrations").await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }
    files.sort();

    let backend = conn.get_database_backend();
    for file in files {
        tracing::debug!(file = %file.display(), "applying migration");
        let sql = fs::read_to_string(&file).await?;
        // Postgres prepared statements cannot contain multiple commands,
        // so split the migration file and run each statement individually.
        for stmt in sql.split(';') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            let statement = format!("{stmt};");
            conn.execute(Statement::from_string(backend, statement))
                .await
                .with_context(|| format!("migration {} failed", file.display()))?;
        }
    }

    Ok(())
}
