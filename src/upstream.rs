//! External AI provider abstraction and implementations.
//!
//! Defines the [`UpstreamAnalyzer`] trait and its implementations:
//! - **[`DisabledUpstream`]**: always unavailable; used when no provider is configured.
//! - **[`OpenAiUpstream`]**: calls the OpenAI chat-completions API and validates
//!   the structured answer.
//!
//! An upstream never decides what the caller sees. Every failure is reported as
//! an [`UpstreamError`] and the orchestrator falls back to the offline analyzer.
//!
//! # Provider Selection
//!
//! Use [`create_upstream`] to instantiate the provider named in config:
//!
//! ```rust
//! # use text_insight::config::UpstreamConfig;
//! # use text_insight::upstream::create_upstream;
//! let config = UpstreamConfig::default(); // provider = "disabled"
//! let upstream = create_upstream(&config).unwrap();
//! assert_eq!(upstream.name(), "disabled");
//! ```
//!
//! # Failure Classification
//!
//! | Condition | Error |
//! |-----------|-------|
//! | key unset, empty, or placeholder | `Unavailable(MissingCredential)` |
//! | HTTP 401 / 403 | `Unavailable(Unauthorized)` |
//! | HTTP 429 | `Unavailable(RateLimited)` |
//! | other non-2xx | `Unavailable(Status(code))` |
//! | client timeout | `Unavailable(Timeout)` |
//! | network failure | `Unavailable(Transport)` |
//! | answer fails validation | `MalformedResponse` |
//!
//! There are no retries: a failed call goes straight to the fallback.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::error::{UnavailableCause, UpstreamError};
use crate::models::{AnalysisMethod, AnalysisResult, Sentiment, DEFAULT_TITLE, MAX_LABELS};

/// Value shipped in sample `.env` files; treated as no key at all.
pub const PLACEHOLDER_API_KEY: &str = "your_openai_api_key_here";

const SYSTEM_PROMPT: &str = "You are a text analysis assistant. Analyze the user's text and \
respond with a single JSON object and nothing else. The object must have exactly these fields:\n\
- \"summary\": a one or two sentence summary of the text\n\
- \"title\": a short title for the text, or null if none fits\n\
- \"topics\": an array of up to 3 key topics\n\
- \"sentiment\": one of \"positive\", \"neutral\", \"negative\"\n\
- \"keywords\": an array of up to 3 important nouns from the text\n\
- \"confidence_score\": a number between 0.0 and 1.0";

/// An external analyzer that may or may not produce a result.
#[async_trait]
pub trait UpstreamAnalyzer: Send + Sync {
    /// Provider identifier (e.g. the model name), used in logs.
    fn name(&self) -> &str;

    async fn analyze(&self, text: &str) -> Result<AnalysisResult, UpstreamError>;
}

// ============ Disabled Provider ============

/// Provider used when `upstream.provider = "disabled"`. Every call is unavailable.
pub struct DisabledUpstream;

#[async_trait]
impl UpstreamAnalyzer for DisabledUpstream {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn analyze(&self, _text: &str) -> Result<AnalysisResult, UpstreamError> {
        Err(UpstreamError::Unavailable(UnavailableCause::Disabled))
    }
}

// ============ OpenAI Provider ============

/// Analyzer backed by `POST {base_url}/chat/completions`.
///
/// The API key is read once, at construction, from the environment variable
/// named by `upstream.api_key_env`. A missing key is not a construction error:
/// calls simply report `MissingCredential` so the fallback takes over.
pub struct OpenAiUpstream {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: Option<String>,
}

impl OpenAiUpstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let key = std::env::var(&config.api_key_env).ok();
        Self::with_api_key(config, key)
    }

    /// Build with an explicit key instead of reading the environment.
    pub fn with_api_key(config: &UpstreamConfig, api_key: Option<String>) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("upstream.model required for OpenAI provider"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && k != PLACEHOLDER_API_KEY);

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl UpstreamAnalyzer for OpenAiUpstream {
    fn name(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, text: &str) -> Result<AnalysisResult, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::Unavailable(UnavailableCause::MissingCredential))?;

        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": text },
            ],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), model = %self.model, "upstream rejected request");
            return Err(UpstreamError::Unavailable(match status.as_u16() {
                401 | 403 => UnavailableCause::Unauthorized,
                429 => UnavailableCause::RateLimited,
                code => UnavailableCause::Status(code),
            }));
        }

        let json: Value = response.json().await?;
        let content = completion_content(&json)?;
        parse_analysis(text, content)
    }
}

/// Extract `choices[0].message.content` from a chat-completions response.
fn completion_content(json: &Value) -> Result<&str, UpstreamError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing choices[0].message.content"))
}

fn malformed(msg: impl Into<String>) -> UpstreamError {
    UpstreamError::MalformedResponse(msg.into())
}

/// Validate the model's answer and build an [`AnalysisResult`] from it.
///
/// The answer may wrap the JSON object in prose or code fences; the span from
/// the first `{` to the last `}` is parsed.
pub fn parse_analysis(original_text: &str, content: &str) -> Result<AnalysisResult, UpstreamError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let object = match (start, end) {
        (Some(s), Some(e)) if s < e => &content[s..=e],
        _ => return Err(malformed("no JSON object in completion")),
    };

    let value: Value = serde_json::from_str(object)
        .map_err(|e| malformed(format!("invalid JSON in completion: {}", e)))?;

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed("summary must be a non-empty string"))?
        .to_string();

    let title = match value.get("title") {
        None | Some(Value::Null) => DEFAULT_TITLE.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => DEFAULT_TITLE.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(_) => return Err(malformed("title must be a string or null")),
    };

    let topics = string_list(&value, "topics")?;
    let keywords = string_list(&value, "keywords")?;

    let sentiment: Sentiment = value
        .get("sentiment")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("sentiment must be a string"))?
        .parse()
        .map_err(|_| malformed("sentiment must be positive, neutral or negative"))?;

    let confidence_score = value
        .get("confidence_score")
        .and_then(Value::as_f64)
        .filter(|c| (0.0..=1.0).contains(c))
        .ok_or_else(|| malformed("confidence_score must be a number in [0, 1]"))?;

    Ok(AnalysisResult {
        original_text: original_text.to_string(),
        title,
        summary,
        topics,
        sentiment,
        keywords,
        confidence_score,
        analysis_method: AnalysisMethod::Openai,
    })
}

fn string_list(value: &Value, field: &str) -> Result<Vec<String>, UpstreamError> {
    let items = value
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(format!("{} must be an array", field)))?;

    let mut out = Vec::with_capacity(items.len().min(MAX_LABELS));
    for item in items {
        let s = item
            .as_str()
            .ok_or_else(|| malformed(format!("{} must contain only strings", field)))?;
        let s = s.trim();
        if !s.is_empty() && out.len() < MAX_LABELS {
            out.push(s.to_string());
        }
    }
    Ok(out)
}

/// Create the [`UpstreamAnalyzer`] named by `upstream.provider`.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledUpstream`] |
/// | `"openai"` | [`OpenAiUpstream`] |
pub fn create_upstream(config: &UpstreamConfig) -> Result<Box<dyn UpstreamAnalyzer>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledUpstream)),
        "openai" => Ok(Box::new(OpenAiUpstream::new(config)?)),
        other => bail!("Unknown upstream provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "The stock market crashed.";

    #[test]
    fn test_parse_well_formed() {
        let content = r#"{"summary":"Markets fell.","title":"Crash","topics":["business","finance","economy","extra"],
            "sentiment":"Negative","keywords":["stock","market"],"confidence_score":0.9}"#;
        let r = parse_analysis(TEXT, content).unwrap();
        assert_eq!(r.original_text, TEXT);
        assert_eq!(r.title, "Crash");
        assert_eq!(r.topics, vec!["business", "finance", "economy"]);
        assert_eq!(r.sentiment, Sentiment::Negative);
        assert_eq!(r.analysis_method, AnalysisMethod::Openai);
        assert_eq!(r.confidence_score, 0.9);
    }

    #[test]
    fn test_parse_wrapped_in_prose() {
        let content = "Sure! Here you go:\n```json\n{\"summary\":\"S.\",\"title\":null,\"topics\":[],\
                       \"sentiment\":\"neutral\",\"keywords\":[],\"confidence_score\":1}\n```";
        let r = parse_analysis(TEXT, content).unwrap();
        assert_eq!(r.title, DEFAULT_TITLE);
        assert_eq!(r.confidence_score, 1.0);
    }

    #[test]
    fn test_parse_rejects_schema_violations() {
        let cases = [
            "no json here",
            "{not json}",
            r#"{"summary":"","topics":[],"sentiment":"neutral","keywords":[],"confidence_score":0.5}"#,
            r#"{"summary":"S","title":5,"topics":[],"sentiment":"neutral","keywords":[],"confidence_score":0.5}"#,
            r#"{"summary":"S","topics":"tech","sentiment":"neutral","keywords":[],"confidence_score":0.5}"#,
            r#"{"summary":"S","topics":[1],"sentiment":"neutral","keywords":[],"confidence_score":0.5}"#,
            r#"{"summary":"S","topics":[],"sentiment":"ecstatic","keywords":[],"confidence_score":0.5}"#,
            r#"{"summary":"S","topics":[],"sentiment":"neutral","keywords":[],"confidence_score":1.5}"#,
            r#"{"summary":"S","topics":[],"sentiment":"neutral","keywords":[]}"#,
        ];
        for content in cases {
            assert!(
                matches!(parse_analysis(TEXT, content), Err(UpstreamError::MalformedResponse(_))),
                "{}",
                content
            );
        }
    }

    #[test]
    fn test_completion_content_missing() {
        let json = serde_json::json!({ "choices": [] });
        assert!(matches!(
            completion_content(&json),
            Err(UpstreamError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_disabled_is_unavailable() {
        let err = DisabledUpstream.analyze(TEXT).await.unwrap_err();
        assert_eq!(err, UpstreamError::Unavailable(UnavailableCause::Disabled));
    }

    #[tokio::test]
    async fn test_placeholder_key_is_missing_credential() {
        let config = UpstreamConfig {
            provider: "openai".to_string(),
            model: Some("gpt-3.5-turbo".to_string()),
            ..Default::default()
        };
        for key in [None, Some(""), Some("  "), Some(PLACEHOLDER_API_KEY)] {
            let upstream =
                OpenAiUpstream::with_api_key(&config, key.map(str::to_string)).unwrap();
            assert!(!upstream.has_credential());
            let err = upstream.analyze(TEXT).await.unwrap_err();
            assert_eq!(
                err,
                UpstreamError::Unavailable(UnavailableCause::MissingCredential)
            );
        }
    }

    #[test]
    fn test_create_upstream() {
        let mut config = UpstreamConfig::default();
        assert_eq!(create_upstream(&config).unwrap().name(), "disabled");

        config.provider = "openai".to_string();
        assert!(create_upstream(&config).is_err()); // model missing

        config.model = Some("gpt-3.5-turbo".to_string());
        assert_eq!(create_upstream(&config).unwrap().name(), "gpt-3.5-turbo");

        config.provider = "bogus".to_string();
        assert!(create_upstream(&config).is_err());
    }
}
