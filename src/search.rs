//! `insight search` and `insight list`.

use anyhow::{bail, Result};

use crate::analyze_cmd::join_or_none;
use crate::config::Config;
use crate::models::{SearchFilter, Sentiment, StoredAnalysis};
use crate::store::{page_size, AnalysisStore, SqliteStore};

fn print_rows(rows: &[StoredAnalysis]) {
    if rows.is_empty() {
        println!("No results.");
        return;
    }

    for (i, row) in rows.iter().enumerate() {
        let a = &row.analysis;
        println!(
            "{}. [{:.2}] {} ({}, {})",
            i + 1,
            a.confidence_score,
            a.title,
            a.sentiment,
            a.analysis_method
        );
        println!("    id: {}", row.id);
        println!("    created: {}", row.created_at);
        println!("    topics: {}", join_or_none(&a.topics));
        println!("    keywords: {}", join_or_none(&a.keywords));
        println!();
    }
}

pub async fn run_search(
    config: &Config,
    topic: Option<String>,
    keyword: Option<String>,
    sentiment: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let sentiment = match sentiment {
        Some(s) => match s.parse::<Sentiment>() {
            Ok(v) => Some(v),
            Err(e) => bail!("{}", e),
        },
        None => None,
    };

    let filter = SearchFilter {
        topic,
        keyword,
        sentiment,
    };
    if filter.is_empty() {
        bail!("Give at least one of --topic, --keyword or --sentiment");
    }

    let store = SqliteStore::open(config).await?;
    let rows = store
        .search(&filter, page_size(limit))
        .await?;
    store.close().await;

    print_rows(&rows);
    Ok(())
}

pub async fn run_list(config: &Config, limit: Option<usize>) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let rows = store.list(page_size(limit)).await?;
    store.close().await;

    print_rows(&rows);
    Ok(())
}
