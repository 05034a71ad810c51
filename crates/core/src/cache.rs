use crate::domain::analysis::AnalysisResult;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

pub const DEFAULT_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
struct CacheEntry {
    result: AnalysisResult,
    fetched_at: DateTime<Utc>,
}

/// Per-ticker analysis results with a fixed time-to-live.
///
/// Staleness is checked lazily on lookup; stale entries stay in the map until the
/// next fresh fetch for the same ticker overwrites them. Concurrent stores for one
/// ticker are last-write-wins.
#[derive(Debug)]
pub struct AnalysisCache {
    entries: tokio::sync::Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_TTL_MINUTES))
    }
}

impl AnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: tokio::sync::Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn lookup(&self, ticker: &str) -> Option<AnalysisResult> {
        self.lookup_at(ticker, Utc::now()).await
    }

    pub async fn lookup_at(&self, ticker: &str, now: DateTime<Utc>) -> Option<AnalysisResult> {
        let guard = self.entries.lock().await;
        let entry = guard.get(ticker)?;
        if now - entry.fetched_at < self.ttl {
            Some(entry.result.clone())
        } else {
            None
        }
    }

    pub async fn store(&self, ticker: &str, result: AnalysisResult) {
        self.store_at(ticker, result, Utc::now()).await
    }

    pub async fn store_at(&self, ticker: &str, result: AnalysisResult, now: DateTime<Utc>) {
        let mut guard = self.entries.lock().await;
        guard.insert(
            ticker.to_string(),
            CacheEntry {
                result,
                fetched_at: now,
            },
        );
    }

    /// Stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
