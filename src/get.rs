//! `insight get <id>`: print one stored analysis in full.

use anyhow::{bail, Result};

use crate::analyze_cmd::join_or_none;
use crate::config::Config;
use crate::store::{AnalysisStore, SqliteStore};

pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let found = store.get(id).await?;
    store.close().await;

    let stored = match found {
        Some(s) => s,
        None => bail!("analysis not found: {}", id),
    };
    let a = &stored.analysis;

    println!("--- Analysis ---");
    println!("id:         {}", stored.id);
    println!("title:      {}", a.title);
    println!("method:     {}", a.analysis_method);
    println!("sentiment:  {}", a.sentiment);
    println!("confidence: {:.2}", a.confidence_score);
    println!("topics:     {}", join_or_none(&a.topics));
    println!("keywords:   {}", join_or_none(&a.keywords));
    println!("created_at: {}", stored.created_at);
    println!("updated_at: {}", stored.updated_at);
    println!();

    println!("--- Summary ---");
    println!("{}", a.summary);
    println!();

    println!("--- Original Text ---");
    println!("{}", a.original_text);

    Ok(())
}
