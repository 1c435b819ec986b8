//! Core data models used throughout Text Insight.
//!
//! [`AnalysisResult`] is what the analyzers produce; [`StoredAnalysis`] is the
//! same record after the store has assigned an id and timestamps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Title used whenever no meaningful label can be derived.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Upper bound on `topics` and `keywords`.
pub const MAX_LABELS: usize = 3;

/// Overall tone of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(format!(
                "invalid sentiment '{}': expected positive, neutral, or negative",
                other
            )),
        }
    }
}

/// Which path produced an [`AnalysisResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    /// The external LLM answered with a well-formed response.
    Openai,
    /// The deterministic offline analyzer stood in.
    Mock,
}

impl AnalysisMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMethod::Openai => "openai",
            AnalysisMethod::Mock => "mock",
        }
    }
}

impl fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(AnalysisMethod::Openai),
            "mock" => Ok(AnalysisMethod::Mock),
            other => Err(format!("invalid analysis method '{}'", other)),
        }
    }
}

/// Structured analysis of one input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub original_text: String,
    pub title: String,
    pub summary: String,
    pub topics: Vec<String>,
    pub sentiment: Sentiment,
    pub keywords: Vec<String>,
    pub confidence_score: f64,
    pub analysis_method: AnalysisMethod,
}

/// An analysis as persisted, with store-assigned identity and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: String,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub created_at: String, // ISO8601
    pub updated_at: String, // ISO8601
}

/// Criteria for searching stored analyses.
///
/// Topic and keyword are case-insensitive substring matches and combine with
/// OR; a keyword also matches the original text. Sentiment is an exact match
/// and narrows whatever the other criteria selected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchFilter {
    pub topic: Option<String>,
    pub keyword: Option<String>,
    pub sentiment: Option<Sentiment>,
}

impl SearchFilter {
    /// True when no criterion is set (blank strings count as unset).
    pub fn is_empty(&self) -> bool {
        non_blank(&self.topic).is_none()
            && non_blank(&self.keyword).is_none()
            && self.sentiment.is_none()
    }

    /// Trimmed, lowercased topic criterion, if set.
    pub fn topic_term(&self) -> Option<String> {
        non_blank(&self.topic).map(str::to_lowercase)
    }

    /// Trimmed, lowercased keyword criterion, if set.
    pub fn keyword_term(&self) -> Option<String> {
        non_blank(&self.keyword).map(str::to_lowercase)
    }

    pub fn matches(&self, analysis: &AnalysisResult) -> bool {
        let topic = self.topic_term();
        let keyword = self.keyword_term();

        let text_match = match (&topic, &keyword) {
            (None, None) => true,
            _ => {
                let topic_hit = topic
                    .as_deref()
                    .is_some_and(|t| contains_ci(&analysis.topics, t));
                let keyword_hit = keyword.as_deref().is_some_and(|k| {
                    contains_ci(&analysis.keywords, k)
                        || analysis.original_text.to_lowercase().contains(k)
                });
                topic_hit || keyword_hit
            }
        };

        let sentiment_match = self
            .sentiment
            .map_or(true, |s| s == analysis.sentiment);

        text_match && sentiment_match
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ci(items: &[String], needle_lower: &str) -> bool {
    items
        .iter()
        .any(|item| item.to_lowercase().contains(needle_lower))
}
