//! Part-of-speech tagging behind a narrow trait.
//!
//! The offline analyzer only needs to know which tokens are nouns, so it
//! depends on [`PosTagger`] rather than on any particular tagger. The shipped
//! [`RuleTagger`] is a small lexicon-and-suffix tagger for English prose;
//! another implementation (a statistical model, a remote service) can be
//! dropped in without touching the scoring code.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::text::Token;

/// Coarse part-of-speech classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Verb,
    Auxiliary,
    Adjective,
    Adverb,
    Pronoun,
    Determiner,
    Preposition,
    Conjunction,
    Numeral,
    Other,
}

impl PartOfSpeech {
    pub fn is_noun(&self) -> bool {
        matches!(self, PartOfSpeech::Noun | PartOfSpeech::ProperNoun)
    }
}

/// Assigns a part of speech to every token, preserving order and length.
pub trait PosTagger: Send + Sync {
    fn tag(&self, tokens: &[Token]) -> Vec<(Token, PartOfSpeech)>;
}

fn set(words: &[&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

static DETERMINERS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "the", "a", "an", "this", "that", "these", "those", "my", "your", "his", "her", "its",
        "our", "their", "some", "any", "each", "every", "no", "another", "either", "neither",
        "much", "many", "few", "several", "all", "both",
    ])
});

static PRONOUNS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "mine",
        "yours", "hers", "ours", "theirs", "myself", "yourself", "himself", "herself",
        "itself", "ourselves", "themselves", "who", "whom", "whose", "which", "what",
        "someone", "something", "anyone", "anything", "everyone", "everything", "nobody",
        "nothing", "it's", "i'm", "you're", "we're", "they're", "he's", "she's", "that's",
        "there's",
    ])
});

/// Pronouns that typically precede a finite verb.
static SUBJECT_PRONOUNS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| set(&["i", "you", "he", "she", "it", "we", "they", "who"]));

static PREPOSITIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "in", "on", "at", "to", "from", "by", "with", "about", "against", "between", "into",
        "through", "during", "before", "after", "above", "below", "over", "under", "of",
        "for", "without", "within", "across", "along", "around", "among", "behind", "beyond",
        "near", "toward", "towards", "upon", "via", "since", "per", "like",
    ])
});

static CONJUNCTIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "and", "or", "but", "nor", "yet", "so", "because", "although", "though", "while",
        "if", "unless", "whereas", "whether", "than", "as", "when", "where",
    ])
});

static AUXILIARIES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "is", "am", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
        "does", "did", "will", "would", "shall", "should", "can", "could", "may", "might",
        "must", "isn't", "aren't", "wasn't", "weren't", "don't", "doesn't", "didn't", "won't",
        "can't", "couldn't", "shouldn't", "wouldn't",
    ])
});

/// Auxiliaries after which an unknown word is read as a verb.
static MODALS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "will", "would", "shall", "should", "can", "could", "may", "might", "must", "do",
        "does", "did", "don't", "doesn't", "didn't", "won't", "can't", "to",
    ])
});

static VERBS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "love", "loves", "hate", "hates", "make", "makes", "made", "get", "gets", "got", "go",
        "goes", "went", "gone", "take", "takes", "took", "see", "sees", "saw", "seen", "know",
        "knows", "knew", "think", "thinks", "thought", "come", "comes", "came", "want",
        "wants", "give", "gives", "gave", "use", "uses", "find", "finds", "found", "tell",
        "tells", "told", "become", "becomes", "became", "seem", "seems", "feel", "feels",
        "felt", "keep", "keeps", "kept", "let", "say", "says", "said", "show", "shows",
        "bring", "brings", "brought", "need", "needs", "help", "helps", "enjoy", "enjoys",
        "remain", "remains", "provide", "provides", "include", "includes", "allow", "allows",
        "rise", "rises", "rose", "fall", "falls", "fell",
    ])
});

static ADJECTIVES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "new", "old", "good", "great", "bad", "big", "small", "large", "long", "short",
        "high", "low", "young", "little", "own", "other", "same", "right", "wrong", "best",
        "worst", "better", "worse", "early", "late", "important", "major", "main", "different",
        "amazing", "awesome", "happy", "sad", "strong", "weak", "poor", "rich", "free",
        "full", "easy", "hard", "clear", "real", "sure", "true", "whole", "recent", "next",
        "last", "first", "second", "third", "modern", "global", "local", "public", "private",
        "human", "social", "political", "economic", "key", "top", "perfect", "incredible",
        "terrible", "horrible", "brilliant", "excellent",
    ])
});

static ADVERBS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    set(&[
        "not", "very", "also", "just", "now", "then", "here", "there", "always", "never",
        "often", "still", "again", "already", "soon", "too", "quite", "rather", "almost",
        "even", "ever", "perhaps", "maybe", "once", "today", "tomorrow", "yesterday", "why",
        "how", "well", "more", "most", "less", "least", "only", "yes", "no",
    ])
});

const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ish", "ical"];

const NOUN_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ness", "ity", "ism", "ist", "ship", "ance", "ence", "ogy",
    "hood", "dom", "age", "ery",
];

/// Lexicon-and-suffix tagger for English.
///
/// Resolution order per token: numerals, closed-class word lists, open-class
/// word lists, context (a word after a subject pronoun or a modal is a verb),
/// suffixes, capitalization (mid-sentence capitals are proper nouns), and
/// finally noun as the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleTagger;

impl RuleTagger {
    pub fn new() -> Self {
        Self
    }

    fn tag_one(&self, token: &Token, prev: Option<&str>) -> PartOfSpeech {
        if token.is_numeric() {
            return PartOfSpeech::Numeral;
        }
        let word = token.lower();
        let w = word.as_str();

        if DETERMINERS.contains(w) {
            return PartOfSpeech::Determiner;
        }
        if PRONOUNS.contains(w) {
            return PartOfSpeech::Pronoun;
        }
        if AUXILIARIES.contains(w) {
            return PartOfSpeech::Auxiliary;
        }
        if CONJUNCTIONS.contains(w) {
            return PartOfSpeech::Conjunction;
        }
        if PREPOSITIONS.contains(w) && !(w == "like" && after_verb_slot(prev)) {
            return PartOfSpeech::Preposition;
        }
        if ADVERBS.contains(w) {
            return PartOfSpeech::Adverb;
        }
        if ADJECTIVES.contains(w) {
            return PartOfSpeech::Adjective;
        }
        if VERBS.contains(w) || after_verb_slot(prev) {
            return PartOfSpeech::Verb;
        }
        if !token.is_alphabetic() {
            return PartOfSpeech::Other;
        }

        let after_determiner = prev.is_some_and(|p| DETERMINERS.contains(p));
        if w.len() > 4 && w.ends_with("ly") {
            return PartOfSpeech::Adverb;
        }
        if NOUN_SUFFIXES.iter().any(|s| has_suffix(w, s)) {
            return PartOfSpeech::Noun;
        }
        if ADJECTIVE_SUFFIXES.iter().any(|s| has_suffix(w, s)) {
            return PartOfSpeech::Adjective;
        }
        if !after_determiner && (has_suffix(w, "ing") || has_suffix(w, "ed")) {
            return PartOfSpeech::Verb;
        }
        if token.is_capitalized() && token.index > 0 {
            return PartOfSpeech::ProperNoun;
        }
        PartOfSpeech::Noun
    }
}

fn after_verb_slot(prev: Option<&str>) -> bool {
    prev.is_some_and(|p| SUBJECT_PRONOUNS.contains(p) || MODALS.contains(p))
}

/// Suffix match that leaves a stem of at least three characters.
fn has_suffix(word: &str, suffix: &str) -> bool {
    word.len() >= suffix.len() + 3 && word.ends_with(suffix)
}

impl PosTagger for RuleTagger {
    fn tag(&self, tokens: &[Token]) -> Vec<(Token, PartOfSpeech)> {
        let mut tagged = Vec::with_capacity(tokens.len());
        let mut prev: Option<String> = None;
        for token in tokens {
            let pos = self.tag_one(token, prev.as_deref());
            prev = Some(token.lower());
            tagged.push((token.clone(), pos));
        }
        tagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::tokenize;

    fn tags(text: &str) -> Vec<(String, PartOfSpeech)> {
        RuleTagger::new()
            .tag(&tokenize(text))
            .into_iter()
            .map(|(t, p)| (t.text, p))
            .collect()
    }

    fn pos_of(text: &str, word: &str) -> PartOfSpeech {
        tags(text)
            .into_iter()
            .find(|(w, _)| w == word)
            .map(|(_, p)| p)
            .unwrap()
    }

    #[test]
    fn test_preserves_length_and_order() {
        let tokens = tokenize("The stock market crashed and investors are worried.");
        let tagged = RuleTagger::new().tag(&tokens);
        assert_eq!(tagged.len(), tokens.len());
        for ((t, _), orig) in tagged.iter().zip(tokens.iter()) {
            assert_eq!(t, orig);
        }
    }

    #[test]
    fn test_example_sentence() {
        let text = "I love this new technology! It's amazing and innovative.";
        assert_eq!(pos_of(text, "I"), PartOfSpeech::Pronoun);
        assert_eq!(pos_of(text, "love"), PartOfSpeech::Verb);
        assert_eq!(pos_of(text, "this"), PartOfSpeech::Determiner);
        assert_eq!(pos_of(text, "new"), PartOfSpeech::Adjective);
        assert_eq!(pos_of(text, "technology"), PartOfSpeech::Noun);
        assert_eq!(pos_of(text, "innovative"), PartOfSpeech::Adjective);
        assert!(!pos_of(text, "amazing").is_noun());
    }

    #[test]
    fn test_suffix_rules() {
        assert_eq!(pos_of("They acted quickly", "quickly"), PartOfSpeech::Adverb);
        assert_eq!(pos_of("the development", "development"), PartOfSpeech::Noun);
        assert_eq!(pos_of("markets crashed", "crashed"), PartOfSpeech::Verb);
        assert_eq!(pos_of("a famous painter", "famous"), PartOfSpeech::Adjective);
    }

    #[test]
    fn test_determiner_context_keeps_gerund_noun() {
        assert!(pos_of("the meeting ended", "meeting").is_noun());
    }

    #[test]
    fn test_context_verb_after_modal() {
        assert_eq!(pos_of("we should invest", "invest"), PartOfSpeech::Verb);
    }

    #[test]
    fn test_numbers_and_proper_nouns() {
        assert_eq!(pos_of("in 2024 Paris hosted", "2024"), PartOfSpeech::Numeral);
        assert_eq!(pos_of("visited Paris today", "Paris"), PartOfSpeech::ProperNoun);
    }

    #[test]
    fn test_default_is_noun() {
        assert_eq!(pos_of("stock market", "stock"), PartOfSpeech::Noun);
        assert_eq!(pos_of("stock market", "market"), PartOfSpeech::Noun);
    }
}
