//! SQLite call store using sqlx
//!
//! All queries are built at runtime, so no database is needed at compile time.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::CallStore;
use crate::error::Result;
use crate::types::{StoredLine, Target};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS responses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    number TEXT NOT NULL UNIQUE,
    raw_line TEXT NOT NULL,
    claimed INTEGER NOT NULL DEFAULT 0,
    recorded_at TEXT NOT NULL
)";

/// Call store backed by a sqlite database
#[derive(Clone)]
pub struct SqliteCallStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow, Debug)]
struct ResponseRow {
    id: i64,
    number: String,
    raw_line: String,
    recorded_at: DateTime<Utc>,
}

impl SqliteCallStore {
    /// Open (creating if needed) the database at `database_url` and ensure the schema exists.
    ///
    /// `sqlite::memory:` gives a private in-memory database.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every pooled connection to an in-memory database would see its own empty database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        info!("Call store ready at {}", database_url);

        Ok(Self { pool })
    }
}

#[async_trait]
impl CallStore for SqliteCallStore {
    async fn has_been_dialed(&self, number: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE number = ?")
            .bind(number)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn record_response(&self, target: &Target) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO responses (number, raw_line, claimed, recorded_at)
             VALUES (?, ?, 0, ?)",
        )
        .bind(&target.number)
        .bind(&target.raw_line)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        debug!("Response for {} recorded: {}", target.number, inserted);
        Ok(inserted)
    }

    async fn claim_next(&self) -> Result<Option<StoredLine>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<ResponseRow> = sqlx::query_as(
            "SELECT id, number, raw_line, recorded_at
             FROM responses
             WHERE claimed = 0
             ORDER BY id ASC
             LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let result = sqlx::query("UPDATE responses SET claimed = 1 WHERE id = ? AND claimed = 0")
            .bind(row.id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        debug!("Line {} claimed", row.number);

        Ok(Some(StoredLine {
            number: row.number,
            raw_line: row.raw_line,
            claimed: true,
            recorded_at: row.recorded_at,
        }))
    }

    async fn count_unclaimed(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE claimed = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}
