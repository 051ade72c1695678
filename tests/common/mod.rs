// Shared test helpers

use challenge_scheduler::leaderboard_repo::sqlite::SqliteLeaderboardStore;
use std::str::FromStr;
use std::sync::Arc;

const TEST_TABLE: &str = "leaderboard";

/// Opens a store under `dir`, creates the schema, and inserts the given
/// (user_id, bucket_id) rows in order. NULLs model records that lack the
/// attribute.
pub async fn seeded_store(
    dir: &tempfile::TempDir,
    page_size: u32,
    rows: &[(Option<&str>, Option<&str>)],
) -> Arc<SqliteLeaderboardStore> {
    let path = dir.path().join("leaderboard.db");
    let path_str = path.to_str().unwrap();

    let store = SqliteLeaderboardStore::connect(path_str, TEST_TABLE, 2, page_size)
        .await
        .unwrap();
    store.init().await.unwrap();

    let opts = sqlx::sqlite::SqliteConnectOptions::from_str(&format!("sqlite:{}", path_str))
        .unwrap()
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect_with(opts)
        .await
        .unwrap();
    for (user_id, bucket_id) in rows {
        sqlx::query(&format!(
            "INSERT INTO {} (user_id, bucket_id) VALUES ($1, $2)",
            TEST_TABLE
        ))
        .bind(*user_id)
        .bind(*bucket_id)
        .execute(&pool)
        .await
        .unwrap();
    }

    Arc::new(store)
}
