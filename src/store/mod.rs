//! Persistence for completed analyses.
//!
//! The [`AnalysisStore`] trait is what the CLI and the HTTP server write to
//! and query. Two backends:
//!
//! - [`SqliteStore`]: the `analyses` table in the configured SQLite file.
//! - [`InMemoryStore`]: a process-local store for tests and ephemeral runs.
//!
//! Stores assign the UUID and both timestamps; analyzers never see them.
//! Every listing is ordered newest first.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{AnalysisResult, SearchFilter, StoredAnalysis};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Rows returned by `list` and `search` when the caller gives no limit. The
/// CLI and the HTTP API share it.
pub const DEFAULT_LIMIT: usize = 100;

/// Requested limits above this are clamped.
pub const MAX_LIMIT: usize = 1000;

/// Resolve a caller's optional limit against the defaults.
pub fn page_size(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
}

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist a result, assigning a fresh id and timestamps.
    async fn insert(&self, analysis: &AnalysisResult) -> Result<StoredAnalysis>;

    async fn get(&self, id: &str) -> Result<Option<StoredAnalysis>>;

    /// Most recent analyses, newest first.
    async fn list(&self, limit: usize) -> Result<Vec<StoredAnalysis>>;

    /// Analyses matching `filter` (see [`SearchFilter::matches`]), newest first.
    async fn search(&self, filter: &SearchFilter, limit: usize) -> Result<Vec<StoredAnalysis>>;
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

pub(crate) fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ts_iso() {
        assert_eq!(format_ts_iso(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_ts_iso(1_700_000_000), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_new_id_is_uuid() {
        let id = new_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_ne!(id, new_id());
    }

    #[test]
    fn test_page_size() {
        assert_eq!(page_size(None), DEFAULT_LIMIT);
        assert_eq!(page_size(Some(0)), 0);
        assert_eq!(page_size(Some(7)), 7);
        assert_eq!(page_size(Some(50_000)), MAX_LIMIT);
    }
}
