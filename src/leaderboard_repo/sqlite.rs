// SQLite-backed leaderboard store. Pages by rowid so a scan walks a stable
// order; the cursor is the last rowid of the previous page.

use super::{LeaderboardRecord, LeaderboardStore, Projection, ScanPage, ScanQuery};
use crate::config::is_sql_identifier;
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

pub struct SqliteLeaderboardStore {
    pool: SqlitePool,
    table: String,
    page_size: u32,
}

impl SqliteLeaderboardStore {
    pub async fn connect(
        path: &str,
        table: &str,
        max_pool_size: u32,
        page_size: u32,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            is_sql_identifier(table),
            "leaderboard table must be a plain identifier, got {:?}",
            table
        );
        anyhow::ensure!(page_size > 0, "scan page size must be > 0");
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self {
            pool,
            table: table.to_string(),
            page_size,
        })
    }

    /// Both columns are nullable: a record may lack a user id or a bucket id.
    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (user_id TEXT, bucket_id TEXT)",
            self.table
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_bucket_id ON {table}(bucket_id)",
            table = self.table
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl LeaderboardStore for SqliteLeaderboardStore {
    async fn scan_page(
        &self,
        query: &ScanQuery,
        cursor: Option<u64>,
    ) -> anyhow::Result<ScanPage> {
        let column = match query.projection {
            Projection::BucketId => "bucket_id",
            Projection::UserId => "user_id",
        };
        let after = cursor.unwrap_or(0) as i64;

        let rows = match &query.bucket_id {
            Some(bucket_id) => {
                sqlx::query(&format!(
                    "SELECT rowid, {column} FROM {table} WHERE rowid > $1 AND bucket_id = $2 ORDER BY rowid LIMIT $3",
                    column = column,
                    table = self.table
                ))
                .bind(after)
                .bind(bucket_id)
                .bind(self.page_size as i64)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT rowid, {column} FROM {table} WHERE rowid > $1 ORDER BY rowid LIMIT $2",
                    column = column,
                    table = self.table
                ))
                .bind(after)
                .bind(self.page_size as i64)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut items = Vec::with_capacity(rows.len());
        let mut last_rowid = after;
        for row in &rows {
            last_rowid = row.try_get("rowid")?;
            let value: Option<String> = row.try_get(column)?;
            items.push(match query.projection {
                Projection::BucketId => LeaderboardRecord {
                    bucket_id: value,
                    user_id: None,
                },
                Projection::UserId => LeaderboardRecord {
                    user_id: value,
                    bucket_id: None,
                },
            });
        }

        // A full page may be the last one; the follow-up call returns an
        // empty page with no cursor and the scan stops there.
        let next_cursor = if rows.len() == self.page_size as usize {
            Some(last_rowid as u64)
        } else {
            None
        };

        Ok(ScanPage { items, next_cursor })
    }
}
