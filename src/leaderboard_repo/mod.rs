// Leaderboard scans. The store yields one page per call; scan_all follows
// the cursor until the store reports no further page.

pub mod sqlite;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

/// Column a scan asks the store to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    BucketId,
    UserId,
}

/// Filter and projection for one scan.
#[derive(Debug, Clone)]
pub struct ScanQuery {
    pub projection: Projection,
    /// Restrict to records of one bucket (exact match; unset scans everything).
    pub bucket_id: Option<String>,
}

/// One leaderboard record. Only the projected attribute is populated, and a
/// record may lack it entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaderboardRecord {
    pub user_id: Option<String>,
    pub bucket_id: Option<String>,
}

/// One page of scan results. `next_cursor` is present when the store may
/// have more records; the final page carries none.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub items: Vec<LeaderboardRecord>,
    pub next_cursor: Option<u64>,
}

/// Paged access to leaderboard records.
#[async_trait]
pub trait LeaderboardStore: Send + Sync {
    async fn scan_page(
        &self,
        query: &ScanQuery,
        cursor: Option<u64>,
    ) -> anyhow::Result<ScanPage>;
}

pub struct LeaderboardRepo {
    store: Arc<dyn LeaderboardStore>,
}

impl LeaderboardRepo {
    pub fn new(store: Arc<dyn LeaderboardStore>) -> Self {
        Self { store }
    }

    /// Full scan: concatenates pages in store order until no cursor remains.
    /// A failing page fails the whole scan; no partial result is returned.
    #[instrument(skip(self, query), fields(repo = "leaderboard", operation = "scan_all"))]
    pub async fn scan_all(&self, query: &ScanQuery) -> anyhow::Result<Vec<LeaderboardRecord>> {
        let mut items = Vec::new();
        let mut cursor = None;
        loop {
            let page = self.store.scan_page(query, cursor).await?;
            items.extend(page.items);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(items)
    }

    /// Distinct bucket ids in first-seen scan order. Records without the
    /// attribute collapse into a single "" entry.
    #[instrument(skip(self), fields(repo = "leaderboard", operation = "get_all_unique_buckets"))]
    pub async fn get_all_unique_buckets(&self) -> anyhow::Result<Vec<String>> {
        let query = ScanQuery {
            projection: Projection::BucketId,
            bucket_id: None,
        };
        let records = self.scan_all(&query).await?;
        let mut seen = HashSet::new();
        let mut buckets = Vec::new();
        for record in records {
            let id = record.bucket_id.unwrap_or_default();
            if seen.insert(id.clone()) {
                buckets.push(id);
            }
        }
        Ok(buckets)
    }

    /// User ids of one bucket's members, in scan order. Records without a
    /// user id are dropped, so an id-only bucket yields an empty list.
    #[instrument(skip(self), fields(repo = "leaderboard", operation = "get_users_in_bucket"))]
    pub async fn get_users_in_bucket(&self, bucket_id: &str) -> anyhow::Result<Vec<String>> {
        let query = ScanQuery {
            projection: Projection::UserId,
            bucket_id: Some(bucket_id.to_string()),
        };
        let records = self.scan_all(&query).await?;
        Ok(records.into_iter().filter_map(|r| r.user_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(user: Option<&str>, bucket: Option<&str>) -> LeaderboardRecord {
        LeaderboardRecord {
            user_id: user.map(str::to_string),
            bucket_id: bucket.map(str::to_string),
        }
    }

    /// Serves pre-built pages; the cursor is an index into `pages`.
    struct PagedStore {
        pages: Vec<ScanPage>,
        calls: AtomicUsize,
    }

    impl PagedStore {
        fn new(pages: Vec<ScanPage>) -> Self {
            Self {
                pages,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LeaderboardStore for PagedStore {
        async fn scan_page(
            &self,
            _query: &ScanQuery,
            cursor: Option<u64>,
        ) -> anyhow::Result<ScanPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let idx = cursor.unwrap_or(0) as usize;
            self.pages
                .get(idx)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no page at cursor {}", idx))
        }
    }

    struct FailingStore;

    #[async_trait]
    impl LeaderboardStore for FailingStore {
        async fn scan_page(
            &self,
            _query: &ScanQuery,
            _cursor: Option<u64>,
        ) -> anyhow::Result<ScanPage> {
            Err(anyhow::anyhow!("store unavailable"))
        }
    }

    fn bucket_query() -> ScanQuery {
        ScanQuery {
            projection: Projection::BucketId,
            bucket_id: None,
        }
    }

    #[tokio::test]
    async fn scan_all_follows_cursor_chain_in_order() {
        let store = Arc::new(PagedStore::new(vec![
            ScanPage {
                items: vec![record(None, Some("b1")), record(None, Some("b2"))],
                next_cursor: Some(1),
            },
            ScanPage {
                items: vec![record(None, Some("b3"))],
                next_cursor: Some(2),
            },
            ScanPage {
                items: vec![record(None, Some("b4"))],
                next_cursor: None,
            },
        ]));
        let repo = LeaderboardRepo::new(store.clone());

        let records = repo.scan_all(&bucket_query()).await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.bucket_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["b1", "b2", "b3", "b4"]);
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn scan_all_single_page_without_cursor() {
        let store = Arc::new(PagedStore::new(vec![ScanPage {
            items: vec![record(None, Some("b1"))],
            next_cursor: None,
        }]));
        let repo = LeaderboardRepo::new(store.clone());

        let records = repo.scan_all(&bucket_query()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scan_all_propagates_store_error() {
        let repo = LeaderboardRepo::new(Arc::new(FailingStore));
        let err = repo.scan_all(&bucket_query()).await.unwrap_err();
        assert!(err.to_string().contains("store unavailable"));
    }

    #[tokio::test]
    async fn unique_buckets_dedup_keeps_first_seen_order() {
        let store = Arc::new(PagedStore::new(vec![
            ScanPage {
                items: vec![
                    record(None, Some("gold")),
                    record(None, Some("silver")),
                    record(None, Some("gold")),
                ],
                next_cursor: Some(1),
            },
            ScanPage {
                items: vec![record(None, Some("silver")), record(None, Some("bronze"))],
                next_cursor: None,
            },
        ]));
        let repo = LeaderboardRepo::new(store);

        let buckets = repo.get_all_unique_buckets().await.unwrap();
        assert_eq!(buckets, vec!["gold", "silver", "bronze"]);
    }

    #[tokio::test]
    async fn unique_buckets_missing_attribute_collapses_to_one_empty_entry() {
        let store = Arc::new(PagedStore::new(vec![ScanPage {
            items: vec![
                record(None, Some("gold")),
                record(None, None),
                record(None, None),
            ],
            next_cursor: None,
        }]));
        let repo = LeaderboardRepo::new(store);

        let buckets = repo.get_all_unique_buckets().await.unwrap();
        assert_eq!(buckets, vec!["gold".to_string(), String::new()]);
    }

    #[tokio::test]
    async fn unique_buckets_empty_store_yields_empty_directory() {
        let store = Arc::new(PagedStore::new(vec![ScanPage::default()]));
        let repo = LeaderboardRepo::new(store);

        let buckets = repo.get_all_unique_buckets().await.unwrap();
        assert!(buckets.is_empty());
    }

    #[tokio::test]
    async fn users_in_bucket_drops_records_without_user_id() {
        let store = Arc::new(PagedStore::new(vec![ScanPage {
            items: vec![
                record(Some("u1"), None),
                record(None, None),
                record(Some("u2"), None),
            ],
            next_cursor: None,
        }]));
        let repo = LeaderboardRepo::new(store);

        let users = repo.get_users_in_bucket("gold").await.unwrap();
        assert_eq!(users, vec!["u1", "u2"]);
    }
}
