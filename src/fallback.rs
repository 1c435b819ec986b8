//! Deterministic offline analyzer.
//!
//! Produces a complete [`AnalysisResult`] from lexical heuristics alone:
//!
//! | Field | Heuristic |
//! |-------|-----------|
//! | title | first sentence, bounded with `...` |
//! | summary | first one or two sentences, bounded with `...` |
//! | topics | lexicon categories ranked by trigger-word count |
//! | sentiment | positive vs negative trigger-word count |
//! | keywords | most frequent nouns (via [`PosTagger`]) |
//! | confidence | signal-strength score, capped at [`MOCK_CONFIDENCE_CAP`] |
//!
//! No randomness, clock, or I/O is involved: the same text always yields the
//! same result.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::lexicon::Lexicon;
use crate::models::{AnalysisMethod, AnalysisResult, Sentiment, DEFAULT_TITLE, MAX_LABELS};
use crate::tagger::{PosTagger, RuleTagger};
use crate::text::{normalize_whitespace, split_sentences, tokenize, truncate_words, Token};

/// Highest confidence a heuristic result may report.
pub const MOCK_CONFIDENCE_CAP: f64 = 0.8;

/// Sentences folded into the summary.
const SUMMARY_SENTENCES: usize = 2;

/// Shortest token considered as a keyword.
const MIN_KEYWORD_CHARS: usize = 3;

/// Rule-based analyzer used whenever the upstream provider cannot answer.
#[derive(Clone)]
pub struct FallbackAnalyzer {
    lexicon: Arc<Lexicon>,
    tagger: Arc<dyn PosTagger>,
    title_max_chars: usize,
    summary_max_chars: usize,
}

/// Raw signal strengths gathered while analyzing, used for the confidence score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signals {
    pub text_chars: usize,
    pub sentence_count: usize,
    /// Scores of the matched topics, best first.
    pub topic_scores: Vec<usize>,
    pub keyword_count: usize,
    pub positive_hits: usize,
    pub negative_hits: usize,
}

impl Default for FallbackAnalyzer {
    fn default() -> Self {
        Self::new(Lexicon::builtin(), Arc::new(RuleTagger::new()))
    }
}

impl FallbackAnalyzer {
    pub fn new(lexicon: Lexicon, tagger: Arc<dyn PosTagger>) -> Self {
        let defaults = AnalysisConfig::default();
        Self {
            lexicon: Arc::new(lexicon),
            tagger,
            title_max_chars: defaults.title_max_chars,
            summary_max_chars: defaults.summary_max_chars,
        }
    }

    /// Build from the `[analysis]` config section, loading its lexicon file if set.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        let lexicon = Lexicon::load(config.lexicon_path.as_deref())?;
        Ok(Self::new(lexicon, Arc::new(RuleTagger::new()))
            .with_limits(config.title_max_chars, config.summary_max_chars))
    }

    pub fn with_limits(mut self, title_max_chars: usize, summary_max_chars: usize) -> Self {
        self.title_max_chars = title_max_chars;
        self.summary_max_chars = summary_max_chars;
        self
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Analyze `text` without any network access.
    ///
    /// Total over non-empty input. Empty input is rejected earlier by the
    /// orchestrator; if it arrives anyway the result is simply sparse.
    pub fn analyze_offline(&self, text: &str) -> AnalysisResult {
        self.analyze_with_signals(text).0
    }

    pub fn analyze_with_signals(&self, text: &str) -> (AnalysisResult, Signals) {
        let sentences: Vec<String> = split_sentences(text)
            .iter()
            .map(|s| normalize_whitespace(s))
            .collect();
        let tokens = tokenize(text);

        let title = self.derive_title(&sentences);
        let summary = self.derive_summary(&sentences);
        let ranked_topics = self.rank_topics(&tokens);
        let (positive_hits, negative_hits) = self.count_sentiment(&tokens);
        let keywords = self.extract_keywords(&tokens);

        let sentiment = match positive_hits.cmp(&negative_hits) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        };

        let signals = Signals {
            text_chars: text.trim().chars().count(),
            sentence_count: sentences.len(),
            topic_scores: ranked_topics.iter().map(|(_, score)| *score).collect(),
            keyword_count: keywords.len(),
            positive_hits,
            negative_hits,
        };
        let confidence_score = confidence(&signals);

        debug!(
            lexicon = %self.lexicon.version,
            sentences = signals.sentence_count,
            positive = positive_hits,
            negative = negative_hits,
            confidence = confidence_score,
            "offline analysis complete"
        );

        let result = AnalysisResult {
            original_text: text.to_string(),
            title,
            summary,
            topics: ranked_topics
                .into_iter()
                .take(MAX_LABELS)
                .map(|(name, _)| name)
                .collect(),
            sentiment,
            keywords,
            confidence_score,
            analysis_method: AnalysisMethod::Mock,
        };
        (result, signals)
    }

    fn derive_title(&self, sentences: &[String]) -> String {
        let first = sentences
            .iter()
            .find(|s| has_word(s))
            .map(String::as_str)
            .unwrap_or_default();
        let stripped = first
            .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | ',' | ';' | ':'))
            .trim();
        if stripped.is_empty() {
            return DEFAULT_TITLE.to_string();
        }
        truncate_words(stripped, self.title_max_chars)
    }

    fn derive_summary(&self, sentences: &[String]) -> String {
        let worded: Vec<&String> = sentences.iter().filter(|s| has_word(s)).collect();
        let source: Vec<&String> = if worded.is_empty() {
            sentences.iter().collect()
        } else {
            worded
        };
        let joined = source
            .into_iter()
            .take(SUMMARY_SENTENCES)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        truncate_words(joined.trim(), self.summary_max_chars)
    }

    /// Matched topics with their scores, best first.
    ///
    /// Ordered by score descending, then by the position of each topic's first
    /// matching token, then by lexicon order.
    fn rank_topics(&self, tokens: &[Token]) -> Vec<(String, usize)> {
        // (score, first matching token index) per category
        let mut scores: Vec<(usize, usize)> = vec![(0, usize::MAX); self.lexicon.topics.len()];
        for token in tokens {
            for idx in self.lexicon.topics_for(&token.lower()) {
                let entry = &mut scores[idx];
                entry.0 += 1;
                entry.1 = entry.1.min(token.index);
            }
        }

        let mut matched: Vec<(usize, usize, usize)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, (score, _))| *score > 0)
            .map(|(idx, (score, first))| (idx, score, first))
            .collect();
        matched.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)).then(a.0.cmp(&b.0)));

        matched
            .into_iter()
            .map(|(idx, score, _)| (self.lexicon.topics[idx].name.clone(), score))
            .collect()
    }

    fn count_sentiment(&self, tokens: &[Token]) -> (usize, usize) {
        tokens.iter().fold((0, 0), |(pos, neg), token| {
            let word = token.lower();
            (
                pos + usize::from(self.lexicon.is_positive(&word)),
                neg + usize::from(self.lexicon.is_negative(&word)),
            )
        })
    }

    /// Most frequent nouns, ties broken by first occurrence.
    fn extract_keywords(&self, tokens: &[Token]) -> Vec<String> {
        let mut order: Vec<(String, usize)> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();

        for (token, pos) in self.tagger.tag(tokens) {
            if !pos.is_noun() || !token.is_alphabetic() {
                continue;
            }
            let word = token.lower();
            if word.chars().count() < MIN_KEYWORD_CHARS || self.lexicon.is_stop_word(&word) {
                continue;
            }
            match slots.get(&word) {
                Some(&slot) => order[slot].1 += 1,
                None => {
                    slots.insert(word.clone(), order.len());
                    order.push((word, 1));
                }
            }
        }

        // Stable sort keeps first-occurrence order among equal counts.
        order.sort_by(|a, b| b.1.cmp(&a.1));
        order
            .into_iter()
            .take(MAX_LABELS)
            .map(|(word, _)| word)
            .collect()
    }
}

/// Confidence of a heuristic result.
///
/// Raw signal in `[0, 1]`:
/// - length: +0.1 above 10 chars, +0.1 above 100, +0.1 above 500
/// - +0.1 for at least two sentences
/// - +0.15 when any topic matched, +0.1 more when the best topic leads outright
/// - +0.05 per keyword
/// - +0.2 when positive and negative counts differ
///
/// The raw value is scaled by [`MOCK_CONFIDENCE_CAP`], clamped to
/// `[0, MOCK_CONFIDENCE_CAP]`, and rounded to two decimals.
pub fn confidence(signals: &Signals) -> f64 {
    let mut raw = 0.0;

    for threshold in [10, 100, 500] {
        if signals.text_chars > threshold {
            raw += 0.1;
        }
    }
    if signals.sentence_count >= 2 {
        raw += 0.1;
    }

    if let Some(&best) = signals.topic_scores.first() {
        raw += 0.15;
        let runner_up = signals.topic_scores.get(1).copied().unwrap_or(0);
        if best > runner_up {
            raw += 0.1;
        }
    }

    raw += 0.05 * signals.keyword_count.min(MAX_LABELS) as f64;

    if signals.positive_hits != signals.negative_hits {
        raw += 0.2;
    }

    let scaled = (raw * MOCK_CONFIDENCE_CAP).clamp(0.0, MOCK_CONFIDENCE_CAP);
    (scaled * 100.0).round() / 100.0
}

/// Sentences made only of punctuation (a leading "...") are skipped for the
/// title and summary.
fn has_word(sentence: &str) -> bool {
    sentence.chars().any(char::is_alphanumeric)
}
