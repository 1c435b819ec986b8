//! Error taxonomy of the analysis core.
//!
//! [`AnalysisError`] is the only failure callers ever see. [`UpstreamError`]
//! describes why the external provider could not be used; the orchestrator
//! absorbs it and records it on [`Analysis::Fallback`](crate::orchestrator::Analysis).

use thiserror::Error;

use crate::orchestrator::MAX_BATCH_SIZE;

/// Caller-visible analysis failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The input text is empty or whitespace-only.
    #[error("input text must not be empty")]
    EmptyInput,

    /// A batch request outside `1..=MAX_BATCH_SIZE` texts.
    #[error("batch must contain between 1 and {max} texts, got {0}", max = MAX_BATCH_SIZE)]
    BatchSize(usize),
}

/// Why the upstream provider could not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Credential, quota, transport, or timeout problems.
    #[error("upstream unavailable: {0}")]
    Unavailable(UnavailableCause),

    /// The provider answered, but the answer failed schema validation.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnavailableCause {
    #[error("provider is disabled")]
    Disabled,
    #[error("API key is not configured")]
    MissingCredential,
    #[error("API key was rejected")]
    Unauthorized,
    #[error("rate limited or quota exceeded")]
    RateLimited,
    #[error("request timed out")]
    Timeout,
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Unavailable(UnavailableCause::Timeout)
        } else if err.is_decode() {
            UpstreamError::MalformedResponse(format!("undecodable body: {}", err))
        } else {
            UpstreamError::Unavailable(UnavailableCause::Transport(err.to_string()))
        }
    }
}

impl From<tokio::time::error::Elapsed> for UpstreamError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        UpstreamError::Unavailable(UnavailableCause::Timeout)
    }
}
