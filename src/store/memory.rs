//! In-memory [`AnalysisStore`] for tests and ephemeral runs.
//!
//! Records live in a `Vec` behind `std::sync::RwLock`, in insertion order;
//! queries walk it backwards so the newest record comes first.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{AnalysisResult, SearchFilter, StoredAnalysis};

use super::{format_ts_iso, new_id, now_ts, AnalysisStore};

pub struct InMemoryStore {
    records: RwLock<Vec<StoredAnalysis>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn newest_first<F>(&self, limit: usize, mut keep: F) -> Result<Vec<StoredAnalysis>>
    where
        F: FnMut(&StoredAnalysis) -> bool,
    {
        let records = self.records.read().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(records
            .iter()
            .rev()
            .filter(|r| keep(r))
            .take(limit)
            .cloned()
            .collect())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryStore {
    async fn insert(&self, analysis: &AnalysisResult) -> Result<StoredAnalysis> {
        let ts = format_ts_iso(now_ts());
        let stored = StoredAnalysis {
            id: new_id(),
            analysis: analysis.clone(),
            created_at: ts.clone(),
            updated_at: ts,
        };
        self.records
            .write()
            .map_err(|_| anyhow!("store lock poisoned"))?
            .push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: &str) -> Result<Option<StoredAnalysis>> {
        let records = self.records.read().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<StoredAnalysis>> {
        self.newest_first(limit, |_| true)
    }

    async fn search(&self, filter: &SearchFilter, limit: usize) -> Result<Vec<StoredAnalysis>> {
        self.newest_first(limit, |r| filter.matches(&r.analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::FallbackAnalyzer;
    use crate::models::Sentiment;

    fn analysis(text: &str) -> AnalysisResult {
        FallbackAnalyzer::default().analyze_offline(text)
    }

    #[tokio::test]
    async fn test_insert_get_list() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());

        let first = store.insert(&analysis("First text about food.")).await.unwrap();
        let second = store.insert(&analysis("Second text about travel.")).await.unwrap();
        assert_eq!(store.len(), 2);
        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at, first.updated_at);

        let got = store.get(&first.id).await.unwrap().unwrap();
        assert_eq!(got, first);
        assert!(store.get("missing").await.unwrap().is_none());

        let listed = store.list(10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(store.list(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search() {
        let store = InMemoryStore::new();
        store
            .insert(&analysis("I love this new technology! It's amazing and innovative."))
            .await
            .unwrap();
        store
            .insert(&analysis("The stock market crashed and investors are worried."))
            .await
            .unwrap();

        let tech = SearchFilter {
            topic: Some("TECH".to_string()),
            ..Default::default()
        };
        assert_eq!(store.search(&tech, 10).await.unwrap().len(), 1);

        let negative = SearchFilter {
            sentiment: Some(Sentiment::Negative),
            ..Default::default()
        };
        let hits = store.search(&negative, 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].analysis.original_text.contains("stock"));

        let narrowed = SearchFilter {
            topic: Some("technology".to_string()),
            sentiment: Some(Sentiment::Negative),
            ..Default::default()
        };
        assert!(store.search(&narrowed, 10).await.unwrap().is_empty());
    }
}
