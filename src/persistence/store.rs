//! SQLite-based run history store

use crate::core::{CheckMethod, RunStatus};
use crate::persistence::{PersistenceBackend, RunSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS runs (
        id TEXT PRIMARY KEY,
        host TEXT NOT NULL,
        check_method TEXT NOT NULL,
        status TEXT NOT NULL,
        started_at TEXT NOT NULL,
        completed_at TEXT,
        checks INTEGER NOT NULL DEFAULT 0,
        connected_checks INTEGER NOT NULL DEFAULT 0,
        outages INTEGER NOT NULL DEFAULT 0,
        log_file TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_host ON runs(host)",
    "CREATE INDEX IF NOT EXISTS idx_started_at ON runs(started_at)",
];

const SELECT_COLUMNS: &str =
    "SELECT id, host, check_method, status, started_at, completed_at, checks, connected_checks, outages, log_file FROM runs";

/// SQLite run history store
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Open (creating if needed) a store at `db_path`
    pub async fn new(db_path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        Self::connect(options).await
    }

    /// A throwaway store that lives as long as the value
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    /// Create store with default path
    pub async fn with_default_path() -> Result<Self> {
        let data_dir = dirs::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
        let db_dir = data_dir.join("connection-monitor");
        std::fs::create_dir_all(&db_dir)
            .with_context(|| format!("Failed to create {}", db_dir.display()))?;

        Self::new(&db_dir.join("history.db")).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        // One connection: an in-memory database is private to its connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to initialize history schema")?;
        }
        Ok(())
    }

    fn to_naive(dt: DateTime<Utc>) -> NaiveDateTime {
        dt.naive_utc()
    }

    fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }

    fn from_row(row: &SqliteRow) -> Result<RunSummary> {
        Ok(RunSummary {
            run_id: Uuid::parse_str(&row.try_get::<String, _>("id")?)?,
            host: row.try_get("host")?,
            check_method: row
                .try_get::<String, _>("check_method")?
                .parse()
                .unwrap_or(CheckMethod::All),
            status: RunStatus::parse(&row.try_get::<String, _>("status")?),
            started_at: Self::from_naive(row.try_get("started_at")?),
            completed_at: row
                .try_get::<Option<NaiveDateTime>, _>("completed_at")?
                .map(Self::from_naive),
            checks: row.try_get::<i64, _>("checks")? as usize,
            connected_checks: row.try_get::<i64, _>("connected_checks")? as usize,
            outages: row.try_get::<i64, _>("outages")? as usize,
            log_file: row.try_get("log_file")?,
        })
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for SqliteHistoryStore {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO runs
            (id, host, check_method, status, started_at, completed_at, checks, connected_checks, outages, log_file)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(run.run_id.to_string())
        .bind(&run.host)
        .bind(run.check_method.as_str())
        .bind(run.status.as_str())
        .bind(Self::to_naive(run.started_at))
        .bind(run.completed_at.map(Self::to_naive))
        .bind(run.checks as i64)
        .bind(run.connected_checks as i64)
        .bind(run.outages as i64)
        .bind(&run.log_file)
        .execute(&self.pool)
        .await
        .context("Failed to save run")?;

        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_COLUMNS))
            .bind(run_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load run")?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list_runs(&self, host: Option<&str>) -> Result<Vec<RunSummary>> {
        let rows = match host {
            Some(host) => {
                sqlx::query(&format!("{} WHERE host = ?1 ORDER BY started_at DESC", SELECT_COLUMNS))
                    .bind(host)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY started_at DESC", SELECT_COLUMNS))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .context("Failed to list runs")?;

        rows.iter().map(Self::from_row).collect()
    }

    async fn list_hosts(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT host FROM runs ORDER BY host ASC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list hosts")?;

        rows.iter()
            .map(|row| row.try_get("host").map_err(Into::into))
            .collect()
    }
}
