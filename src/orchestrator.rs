//! Upstream-first analysis with deterministic fallback.
//!
//! The [`Orchestrator`] asks the configured [`UpstreamAnalyzer`] first and, on
//! any upstream failure, answers with the [`FallbackAnalyzer`] instead. The
//! two outcomes are kept apart in [`Analysis`] so callers can tell a model
//! answer from a heuristic one without inspecting errors.
//!
//! ```text
//! text ──▶ empty? ──yes──▶ AnalysisError::EmptyInput
//!            │no
//!            ▼
//!      upstream.analyze (bounded by timeout)
//!        ├── Ok  ──▶ Analysis::Upstream
//!        └── Err ──▶ fallback.analyze_offline ──▶ Analysis::Fallback { cause }
//! ```

use anyhow::Result;
use futures::future::join_all;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AnalysisError, UpstreamError};
use crate::fallback::FallbackAnalyzer;
use crate::models::{AnalysisMethod, AnalysisResult};
use crate::upstream::{create_upstream, UpstreamAnalyzer};

/// Largest number of texts accepted in one batch.
pub const MAX_BATCH_SIZE: usize = 10;

/// Outcome of a single analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    /// The upstream provider answered with a valid result.
    Upstream(AnalysisResult),
    /// The upstream failed; `result` comes from the offline analyzer.
    Fallback {
        result: AnalysisResult,
        cause: UpstreamError,
    },
}

impl Analysis {
    pub fn result(&self) -> &AnalysisResult {
        match self {
            Analysis::Upstream(result) => result,
            Analysis::Fallback { result, .. } => result,
        }
    }

    pub fn into_result(self) -> AnalysisResult {
        match self {
            Analysis::Upstream(result) => result,
            Analysis::Fallback { result, .. } => result,
        }
    }

    pub fn method(&self) -> AnalysisMethod {
        self.result().analysis_method
    }

    /// Why the upstream was not used, for fallback outcomes.
    pub fn cause(&self) -> Option<&UpstreamError> {
        match self {
            Analysis::Upstream(_) => None,
            Analysis::Fallback { cause, .. } => Some(cause),
        }
    }
}

/// Runs the upstream-then-fallback pipeline. Stateless between calls.
pub struct Orchestrator {
    upstream: Box<dyn UpstreamAnalyzer>,
    fallback: FallbackAnalyzer,
    timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        upstream: Box<dyn UpstreamAnalyzer>,
        fallback: FallbackAnalyzer,
        timeout: Duration,
    ) -> Self {
        Self {
            upstream,
            fallback,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let upstream = create_upstream(&config.upstream)?;
        let fallback = FallbackAnalyzer::from_config(&config.analysis)?;
        info!(
            upstream = upstream.name(),
            lexicon = %fallback.lexicon().version,
            "analysis pipeline ready"
        );
        Ok(Self::new(
            upstream,
            fallback,
            Duration::from_secs(config.upstream.timeout_secs),
        ))
    }

    pub fn fallback(&self) -> &FallbackAnalyzer {
        &self.fallback
    }

    /// Analyze one text.
    ///
    /// Fails only for empty or whitespace-only input, before any network
    /// call. Upstream failures are absorbed into [`Analysis::Fallback`].
    pub async fn analyze(&self, text: &str) -> Result<Analysis, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let attempt = tokio::time::timeout(self.timeout, self.upstream.analyze(text))
            .await
            .map_err(UpstreamError::from)
            .and_then(|inner| inner);

        match attempt {
            Ok(result) => Ok(Analysis::Upstream(result)),
            Err(cause) => {
                warn!(
                    upstream = self.upstream.name(),
                    cause = %cause,
                    "upstream analysis failed, using offline analyzer"
                );
                Ok(Analysis::Fallback {
                    result: self.fallback.analyze_offline(text),
                    cause,
                })
            }
        }
    }

    /// Analyze up to [`MAX_BATCH_SIZE`] texts concurrently.
    ///
    /// The outer error rejects the batch as a whole; each inner result belongs
    /// to the text at the same index, so one bad item never hides the others.
    pub async fn analyze_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<Result<Analysis, AnalysisError>>, AnalysisError> {
        if texts.is_empty() || texts.len() > MAX_BATCH_SIZE {
            return Err(AnalysisError::BatchSize(texts.len()));
        }
        Ok(join_all(texts.iter().map(|text| self.analyze(text))).await)
    }
}
