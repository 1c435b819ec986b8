//! SQLite-backed [`AnalysisStore`].
//!
//! One row per analysis in the `analyses` table. Topics and keywords are
//! stored as JSON arrays; timestamps as Unix seconds, rendered ISO 8601 on the
//! way out. Search narrows candidates in SQL (sentiment equality plus a `LIKE`
//! prefilter on the text columns) and confirms each decoded row with
//! [`SearchFilter::matches`].

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::{AnalysisResult, SearchFilter, StoredAnalysis};

use super::{format_ts_iso, new_id, now_ts, AnalysisStore};

const COLUMNS: &str = "id, original_text, title, summary, topics_json, keywords_json, \
                       sentiment, confidence_score, analysis_method, created_at, updated_at";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database, creating the schema if needed.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn decode_row(row: &SqliteRow) -> Result<StoredAnalysis> {
    let id: String = row.get("id");
    let topics_json: String = row.get("topics_json");
    let keywords_json: String = row.get("keywords_json");
    let sentiment: String = row.get("sentiment");
    let method: String = row.get("analysis_method");
    let created_at: i64 = row.get("created_at");
    let updated_at: i64 = row.get("updated_at");

    Ok(StoredAnalysis {
        analysis: AnalysisResult {
            original_text: row.get("original_text"),
            title: row.get("title"),
            summary: row.get("summary"),
            topics: serde_json::from_str(&topics_json)
                .with_context(|| format!("corrupt topics for analysis {}", id))?,
            sentiment: sentiment
                .parse()
                .map_err(|e| anyhow!("corrupt sentiment for analysis {}: {}", id, e))?,
            keywords: serde_json::from_str(&keywords_json)
                .with_context(|| format!("corrupt keywords for analysis {}", id))?,
            confidence_score: row.get("confidence_score"),
            analysis_method: method
                .parse()
                .map_err(|e| anyhow!("corrupt analysis_method for analysis {}: {}", id, e))?,
        },
        id,
        created_at: format_ts_iso(created_at),
        updated_at: format_ts_iso(updated_at),
    })
}

#[async_trait]
impl AnalysisStore for SqliteStore {
    async fn insert(&self, analysis: &AnalysisResult) -> Result<StoredAnalysis> {
        let id = new_id();
        let now = now_ts();

        sqlx::query(
            "INSERT INTO analyses (id, original_text, title, summary, topics_json, keywords_json, \
             sentiment, confidence_score, analysis_method, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&analysis.original_text)
        .bind(&analysis.title)
        .bind(&analysis.summary)
        .bind(serde_json::to_string(&analysis.topics)?)
        .bind(serde_json::to_string(&analysis.keywords)?)
        .bind(analysis.sentiment.as_str())
        .bind(analysis.confidence_score)
        .bind(analysis.analysis_method.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(StoredAnalysis {
            id,
            analysis: analysis.clone(),
            created_at: format_ts_iso(now),
            updated_at: format_ts_iso(now),
        })
    }

    async fn get(&self, id: &str) -> Result<Option<StoredAnalysis>> {
        let row = sqlx::query(&format!("SELECT {} FROM analyses WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(decode_row).transpose()
    }

    async fn list(&self, limit: usize) -> Result<Vec<StoredAnalysis>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM analyses ORDER BY created_at DESC, rowid DESC LIMIT ?",
            COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(decode_row).collect()
    }

    async fn search(&self, filter: &SearchFilter, limit: usize) -> Result<Vec<StoredAnalysis>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conditions = Vec::new();
        let mut binds = Vec::new();

        if let Some(sentiment) = filter.sentiment {
            conditions.push("sentiment = ?".to_string());
            binds.push(sentiment.as_str().to_string());
        }

        let topic = filter.topic_term();
        let keyword = filter.keyword_term();
        let prefilterable = [&topic, &keyword]
            .into_iter()
            .flatten()
            .all(|term| like_safe(term));
        if prefilterable && (topic.is_some() || keyword.is_some()) {
            let mut either = Vec::new();
            if let Some(term) = &topic {
                either.push("topics_json LIKE ? ESCAPE '\\'");
                binds.push(like_pattern(term));
            }
            if let Some(term) = &keyword {
                either.push("keywords_json LIKE ? ESCAPE '\\'");
                either.push("original_text LIKE ? ESCAPE '\\'");
                binds.push(like_pattern(term));
                binds.push(like_pattern(term));
            }
            conditions.push(format!("({})", either.join(" OR ")));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM analyses {} ORDER BY created_at DESC, rowid DESC",
            COLUMNS, where_clause
        );

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut results = Vec::new();
        for row in &rows {
            if results.len() >= limit {
                break;
            }
            let stored = decode_row(row)?;
            if filter.matches(&stored.analysis) {
                results.push(stored);
            }
        }
        Ok(results)
    }
}

/// SQLite's `LIKE` folds ASCII case only, and the list columns hold JSON
/// with escaped quotes and backslashes. Other terms skip the prefilter.
fn like_safe(term: &str) -> bool {
    term.is_ascii() && !term.contains(['"', '\\']) && !term.chars().any(|c| c.is_ascii_control())
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
