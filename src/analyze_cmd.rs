//! `insight analyze`, `insight batch` and `insight lexicon`.
//!
//! Analysis commands run the full pipeline (upstream first, offline fallback)
//! and, unless `--no-save` is given, persist the result to SQLite.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::lexicon::Lexicon;
use crate::models::{AnalysisResult, StoredAnalysis};
use crate::orchestrator::{Orchestrator, MAX_BATCH_SIZE};
use crate::store::{AnalysisStore, SqliteStore};

/// Text from the positional argument, a file, or stdin, in that order.
fn read_input(text: Option<String>, file: Option<&Path>) -> Result<String> {
    match (text, file) {
        (Some(_), Some(_)) => bail!("Pass either TEXT or --file, not both"),
        (Some(t), None) => Ok(t),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            Ok(buf)
        }
    }
}

fn ensure_length(config: &Config, text: &str) -> Result<()> {
    let chars = text.chars().count();
    if chars > config.analysis.max_text_chars {
        bail!(
            "Text is {} characters long; the limit is {} (analysis.max_text_chars)",
            chars,
            config.analysis.max_text_chars
        );
    }
    Ok(())
}

fn print_analysis(stored: Option<&StoredAnalysis>, result: &AnalysisResult, cause: Option<&str>) {
    println!("--- Analysis ---");
    if let Some(s) = stored {
        println!("id:         {}", s.id);
    }
    println!("title:      {}", result.title);
    match cause {
        Some(c) => println!("method:     {} (fallback: {})", result.analysis_method, c),
        None => println!("method:     {}", result.analysis_method),
    }
    println!("sentiment:  {}", result.sentiment);
    println!("confidence: {:.2}", result.confidence_score);
    println!("topics:     {}", join_or_none(&result.topics));
    println!("keywords:   {}", join_or_none(&result.keywords));
    if let Some(s) = stored {
        println!("created_at: {}", s.created_at);
    }
    println!();
    println!("--- Summary ---");
    println!("{}", result.summary);
}

pub(crate) fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

pub async fn run_analyze(
    config: &Config,
    text: Option<String>,
    file: Option<PathBuf>,
    no_save: bool,
    json: bool,
) -> Result<()> {
    let text = read_input(text, file.as_deref())?;
    ensure_length(config, &text)?;

    let orchestrator = Orchestrator::from_config(config)?;
    let analysis = orchestrator.analyze(&text).await?;
    let cause = analysis.cause().map(|c| c.to_string());
    let result = analysis.into_result();

    if no_save {
        if json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_analysis(None, &result, cause.as_deref());
        }
        return Ok(());
    }

    let store = SqliteStore::open(config).await?;
    let stored = store.insert(&result).await?;
    store.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&stored)?);
    } else {
        print_analysis(Some(&stored), &stored.analysis, cause.as_deref());
    }
    Ok(())
}

/// Analyze several texts at once. With `--file`, each non-blank line is one text.
pub async fn run_batch(
    config: &Config,
    texts: Vec<String>,
    file: Option<PathBuf>,
    no_save: bool,
) -> Result<()> {
    let mut texts = texts;
    if let Some(path) = file {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        texts.extend(
            content
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string),
        );
    }
    if texts.is_empty() || texts.len() > MAX_BATCH_SIZE {
        bail!(
            "Batch must contain between 1 and {} texts, got {}",
            MAX_BATCH_SIZE,
            texts.len()
        );
    }
    for text in &texts {
        ensure_length(config, text)?;
    }

    let orchestrator = Orchestrator::from_config(config)?;
    let results = orchestrator.analyze_batch(&texts).await?;

    let store = if no_save {
        None
    } else {
        Some(SqliteStore::open(config).await?)
    };

    let mut succeeded = 0;
    for (i, item) in results.into_iter().enumerate() {
        match item {
            Ok(analysis) => {
                succeeded += 1;
                let result = analysis.into_result();
                let id = match &store {
                    Some(s) => s.insert(&result).await?.id,
                    None => "-".to_string(),
                };
                println!(
                    "[{}] {}  {}  {}  {:.2}  {}",
                    i + 1,
                    id,
                    result.analysis_method,
                    result.sentiment,
                    result.confidence_score,
                    result.title
                );
            }
            Err(e) => println!("[{}] error: {}", i + 1, e),
        }
    }

    if let Some(s) = store {
        s.close().await;
    }

    println!();
    println!(
        "Processed {} texts: {} succeeded, {} failed.",
        texts.len(),
        succeeded,
        texts.len() - succeeded
    );
    Ok(())
}

/// Print the active lexicon: version, topic categories and list sizes.
pub fn run_lexicon(config: &Config) -> Result<()> {
    let lexicon = Lexicon::load(config.analysis.lexicon_path.as_deref())?;

    println!("Lexicon: {}", lexicon.version);
    match &config.analysis.lexicon_path {
        Some(p) => println!("Source:  {}", p.display()),
        None => println!("Source:  built-in"),
    }
    println!();
    println!("{:<16} TRIGGERS", "TOPIC");
    for topic in &lexicon.topics {
        println!("{:<16} {}", topic.name, topic.triggers.len());
    }
    println!();
    println!("positive words: {}", lexicon.positive.len());
    println!("negative words: {}", lexicon.negative.len());
    println!("stop words:     {}", lexicon.stop_words.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_prefers_argument() {
        assert_eq!(read_input(Some("hi".to_string()), None).unwrap(), "hi");
    }

    #[test]
    fn test_read_input_rejects_both() {
        assert!(read_input(Some("hi".to_string()), Some(Path::new("x.txt"))).is_err());
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "From a file.").unwrap();
        assert_eq!(read_input(None, Some(&path)).unwrap(), "From a file.");
    }

    #[test]
    fn test_join_or_none() {
        assert_eq!(join_or_none(&[]), "(none)");
        assert_eq!(
            join_or_none(&["a".to_string(), "b".to_string()]),
            "a, b"
        );
    }
}
