//! Versioned word lists driving the offline analyzer.
//!
//! A [`Lexicon`] maps topic categories and sentiment polarities to trigger
//! words, plus the stop-words excluded from keyword extraction. The built-in
//! lexicon ships with the binary; a TOML file can replace any part of it:
//!
//! ```toml
//! version = "newsroom-2"
//!
//! [sentiment]
//! positive = ["bullish", "rally"]
//! negative = ["bearish", "slump"]
//!
//! [[topics]]
//! name = "markets"
//! triggers = ["stock", "bond", "index"]
//! ```
//!
//! Sections left out of the file keep their built-in contents.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

pub const BUILTIN_VERSION: &str = "builtin-1";

const TOPICS: &[(&str, &[&str])] = &[
    (
        "technology",
        &[
            "technology", "tech", "innovation", "innovative", "digital", "software",
            "hardware", "computer", "computing", "internet", "ai", "artificial",
            "intelligence", "algorithm", "data", "robot", "robotics", "smartphone", "app",
            "device", "cyber", "cloud", "machine", "programming", "code", "electronics",
            "gadget", "automation", "blockchain", "startup",
        ],
    ),
    (
        "health",
        &[
            "health", "healthcare", "medical", "medicine", "doctor", "hospital", "patient",
            "disease", "wellness", "fitness", "exercise", "diet", "mental", "therapy",
            "vaccine", "symptom", "treatment", "clinic", "nurse", "illness", "virus",
        ],
    ),
    (
        "business",
        &[
            "business", "economy", "economic", "finance", "financial", "market", "stock",
            "investor", "investment", "invest", "company", "revenue", "profit", "bank",
            "banking", "trade", "trading", "sale", "industry", "corporate", "share",
            "money", "price", "inflation", "entrepreneur", "customer", "funding",
        ],
    ),
    (
        "education",
        &[
            "education", "learning", "school", "student", "teacher", "university",
            "college", "course", "classroom", "study", "knowledge", "curriculum", "lesson",
            "academic", "exam", "degree", "training",
        ],
    ),
    (
        "environment",
        &[
            "environment", "environmental", "climate", "sustainability", "sustainable",
            "pollution", "carbon", "emission", "energy", "renewable", "solar", "recycling",
            "forest", "wildlife", "ocean", "conservation", "ecosystem", "warming",
        ],
    ),
    (
        "science",
        &[
            "science", "scientific", "research", "researcher", "scientist", "discovery",
            "experiment", "physics", "chemistry", "biology", "laboratory", "theory", "space",
            "astronomy", "quantum", "genetic", "evolution",
        ],
    ),
    (
        "culture",
        &[
            "culture", "cultural", "society", "social", "community", "tradition", "heritage",
            "festival", "religion", "language", "history", "identity",
        ],
    ),
    (
        "art",
        &[
            "art", "artist", "creativity", "creative", "design", "painting", "music", "film",
            "movie", "museum", "gallery", "sculpture", "literature", "poetry", "theater",
            "dance", "photography",
        ],
    ),
    (
        "travel",
        &[
            "travel", "trip", "journey", "adventure", "exploration", "tourism", "tourist",
            "vacation", "holiday", "flight", "hotel", "destination", "beach", "passport",
            "explore",
        ],
    ),
    (
        "food",
        &[
            "food", "cooking", "cook", "recipe", "nutrition", "meal", "restaurant", "cuisine",
            "dish", "ingredient", "kitchen", "chef", "taste", "bake", "baking", "eat",
            "eating", "vegetable", "fruit",
        ],
    ),
];

const POSITIVE: &[&str] = &[
    "excellent", "amazing", "great", "wonderful", "fantastic", "outstanding", "brilliant",
    "superb", "incredible", "remarkable", "love", "loved", "loves", "like", "liked", "good",
    "happy", "best", "beautiful", "enjoy", "enjoyed", "exciting", "excited", "impressive",
    "innovative", "success", "successful", "benefit", "improve", "improved", "progress",
    "win", "won", "gain", "gains", "strong", "positive", "delighted", "pleased", "perfect",
    "awesome", "helpful", "inspiring", "thrilled", "glad", "optimistic", "breakthrough",
    "delicious",
];

const NEGATIVE: &[&str] = &[
    "terrible", "awful", "horrible", "disappointing", "frustrating", "concerning",
    "problematic", "difficult", "challenging", "negative", "bad", "poor", "worst", "hate",
    "hated", "sad", "angry", "worried", "worry", "fear", "afraid", "crash", "crashed",
    "crashes", "decline", "declined", "loss", "losses", "fail", "failed", "failure", "risk",
    "crisis", "problem", "problems", "weak", "broken", "pain", "danger", "dangerous",
    "threat", "collapse", "collapsed", "unfortunately", "anxious", "struggle", "struggling",
];

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "nor", "for", "yet", "so", "i", "you", "he", "she",
    "it", "we", "they", "me", "him", "her", "us", "them", "my", "your", "his", "its", "our",
    "their", "mine", "yours", "hers", "ours", "theirs", "this", "that", "these", "those",
    "who", "whom", "which", "what", "whose", "is", "am", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "will", "would",
    "shall", "should", "can", "could", "may", "might", "must", "in", "on", "at", "to", "from",
    "by", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "up", "down", "out", "off", "over", "under", "again",
    "further", "here", "there", "where", "when", "why", "how", "all", "each", "every",
    "both", "few", "more", "most", "other", "some", "any", "no", "not", "only", "own",
    "same", "than", "too", "very", "just", "also", "now", "then", "once", "always", "never",
    "if", "because", "as", "until", "while", "although", "though", "yes", "maybe", "of",
    "such", "thing", "things", "way", "lot", "lots",
];

/// A named topic and the words that signal it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCategory {
    pub name: String,
    pub triggers: HashSet<String>,
}

/// Word lists used by the offline analyzer. Topic order breaks scoring ties.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub version: String,
    pub topics: Vec<TopicCategory>,
    pub positive: HashSet<String>,
    pub negative: HashSet<String>,
    pub stop_words: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    version: String,
    #[serde(default)]
    topics: Option<Vec<TopicEntry>>,
    #[serde(default)]
    sentiment: Option<SentimentEntry>,
    #[serde(default)]
    stop_words: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TopicEntry {
    name: String,
    triggers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SentimentEntry {
    #[serde(default)]
    positive: Option<Vec<String>>,
    #[serde(default)]
    negative: Option<Vec<String>>,
}

fn word_set<'a>(words: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Lexicon {
    /// The lexicon compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            version: BUILTIN_VERSION.to_string(),
            topics: TOPICS
                .iter()
                .map(|(name, triggers)| TopicCategory {
                    name: name.to_string(),
                    triggers: word_set(triggers.iter().copied()),
                })
                .collect(),
            positive: word_set(POSITIVE.iter().copied()),
            negative: word_set(NEGATIVE.iter().copied()),
            stop_words: word_set(STOP_WORDS.iter().copied()),
        }
    }

    /// Load a lexicon from a TOML file, keeping built-in sections it omits.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid lexicon file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: LexiconFile = toml::from_str(content)?;
        let mut lexicon = Self::builtin();

        if file.version.trim().is_empty() {
            bail!("lexicon version must not be empty");
        }
        lexicon.version = file.version.trim().to_string();

        if let Some(topics) = file.topics {
            if topics.is_empty() {
                bail!("lexicon must define at least one topic");
            }
            let mut categories = Vec::with_capacity(topics.len());
            for entry in topics {
                let triggers = word_set(entry.triggers.iter().map(String::as_str));
                if entry.name.trim().is_empty() {
                    bail!("lexicon topic names must not be empty");
                }
                if triggers.is_empty() {
                    bail!("lexicon topic '{}' has no trigger words", entry.name);
                }
                categories.push(TopicCategory {
                    name: entry.name.trim().to_string(),
                    triggers,
                });
            }
            lexicon.topics = categories;
        }

        if let Some(sentiment) = file.sentiment {
            if let Some(positive) = sentiment.positive {
                lexicon.positive = word_set(positive.iter().map(String::as_str));
            }
            if let Some(negative) = sentiment.negative {
                lexicon.negative = word_set(negative.iter().map(String::as_str));
            }
        }

        if let Some(stop_words) = file.stop_words {
            lexicon.stop_words = word_set(stop_words.iter().map(String::as_str));
        }

        Ok(lexicon)
    }

    /// The built-in lexicon, or the file named in config when one is set.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::builtin()),
        }
    }

    /// Indices of every topic the lowercase `word` triggers.
    ///
    /// Simple plurals (`-s`, `-ies`) are folded onto their singular form.
    pub fn topics_for(&self, word: &str) -> Vec<usize> {
        let forms = singular_forms(word);
        self.topics
            .iter()
            .enumerate()
            .filter(|(_, cat)| forms.iter().any(|f| cat.triggers.contains(f.as_str())))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_positive(&self, word: &str) -> bool {
        self.positive.contains(word)
    }

    pub fn is_negative(&self, word: &str) -> bool {
        self.negative.contains(word)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }
}

fn singular_forms(word: &str) -> Vec<String> {
    let mut forms = vec![word.to_string()];
    if word.len() > 4 {
        if let Some(stem) = word.strip_suffix("ies") {
            forms.push(format!("{}y", stem));
        }
    }
    if word.len() > 3 && !word.ends_with("ss") {
        if let Some(stem) = word.strip_suffix('s') {
            forms.push(stem.to_string());
        }
    }
    forms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_ten_categories() {
        let lex = Lexicon::builtin();
        assert_eq!(lex.version, BUILTIN_VERSION);
        assert_eq!(lex.topics.len(), 10);
        assert_eq!(lex.topics[0].name, "technology");
        assert!(lex.topics.iter().all(|t| !t.triggers.is_empty()));
    }

    #[test]
    fn test_topics_for_folds_plurals() {
        let lex = Lexicon::builtin();
        let business = lex.topics.iter().position(|t| t.name == "business").unwrap();
        assert!(lex.topics_for("investors").contains(&business));
        assert!(lex.topics_for("companies").contains(&business));
        assert!(lex.topics_for("stock").contains(&business));
        assert!(lex.topics_for("zebra").is_empty());
    }

    #[test]
    fn test_sentiment_sets() {
        let lex = Lexicon::builtin();
        assert!(lex.is_positive("love"));
        assert!(lex.is_negative("crashed"));
        assert!(!lex.is_positive("crashed"));
    }

    #[test]
    fn test_from_toml_overrides_sections() {
        let lex = Lexicon::from_toml(
            r#"
version = "custom-1"

[sentiment]
positive = ["Bullish"]

[[topics]]
name = "markets"
triggers = ["bond", "index"]
"#,
        )
        .unwrap();
        assert_eq!(lex.version, "custom-1");
        assert_eq!(lex.topics.len(), 1);
        assert!(lex.is_positive("bullish"));
        assert!(!lex.is_positive("love"));
        // Negative list and stop-words stay built-in.
        assert!(lex.is_negative("crashed"));
        assert!(lex.is_stop_word("the"));
    }

    #[test]
    fn test_from_toml_rejects_empty_topic() {
        let err = Lexicon::from_toml(
            r#"
version = "bad"

[[topics]]
name = "empty"
triggers = []
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_from_toml_requires_version() {
        assert!(Lexicon::from_toml("version = \"  \"").is_err());
        assert!(Lexicon::from_toml("[sentiment]\npositive = [\"x\"]").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lexicon.toml");
        std::fs::write(&path, "version = \"file-1\"\nstop_words = [\"foo\"]\n").unwrap();
        let lex = Lexicon::load(Some(&path)).unwrap();
        assert_eq!(lex.version, "file-1");
        assert!(lex.is_stop_word("foo"));
        assert!(!lex.is_stop_word("the"));
        assert_eq!(lex.topics.len(), 10);
    }
}
