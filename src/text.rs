//! Tokenization, sentence splitting, and length-bounded truncation.
//!
//! Everything here is pure and allocation-light; the offline analyzer and the
//! tagger both build on [`tokenize`].

/// A word token with its position in the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The word as written (apostrophes normalized to `'`).
    pub text: String,
    /// Zero-based position among all tokens of the text.
    pub index: usize,
}

impl Token {
    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    pub fn is_alphabetic(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_alphabetic)
    }

    pub fn is_numeric(&self) -> bool {
        self.text.chars().any(|c| c.is_ascii_digit())
            && self.text.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    }

    /// Starts with an uppercase letter.
    pub fn is_capitalized(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Split text into word tokens.
///
/// A word is a run of alphanumeric characters; an apostrophe or hyphen is kept
/// only when it sits between two alphanumerics (`it's`, `state-of-the-art`).
/// Punctuation and whitespace separate words and are dropped.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            current.push(c);
            continue;
        }

        let joiner = matches!(c, '\'' | '\u{2019}' | '-');
        let next_is_alnum = chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
        if joiner && !current.is_empty() && next_is_alnum {
            current.push(if c == '-' { '-' } else { '\'' });
            continue;
        }

        flush(&mut current, &mut tokens);
    }
    flush(&mut current, &mut tokens);

    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<Token>) {
    if !current.is_empty() {
        let index = tokens.len();
        tokens.push(Token {
            text: std::mem::take(current),
            index,
        });
    }
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
}

/// Split text into sentences.
///
/// A boundary is terminal punctuation (`.`, `!`, `?`), optionally followed by
/// closing quotes or brackets, followed by whitespace or the end of the text.
/// Runs like `?!` stay together. Sentences are trimmed; empty ones dropped.
/// Text without any boundary is returned as a single sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if is_terminal(chars[i]) {
            let mut end = i + 1;
            while end < chars.len() && (is_terminal(chars[end]) || is_closer(chars[end])) {
                end += 1;
            }
            if end == chars.len() || chars[end].is_whitespace() {
                push_sentence(&chars[start..end], &mut sentences);
                start = end;
            }
            i = end;
        } else {
            i += 1;
        }
    }
    if start < chars.len() {
        push_sentence(&chars[start..], &mut sentences);
    }

    sentences
}

fn push_sentence(chars: &[char], sentences: &mut Vec<String>) {
    let sentence: String = chars.iter().collect();
    let trimmed = sentence.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// Collapse internal whitespace runs to single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

const ELLIPSIS: &str = "...";

/// Bound `text` to `max_chars` characters.
///
/// Text that fits is returned unchanged. Otherwise it is cut at the last word
/// boundary that leaves room for `...`, so the result never exceeds
/// `max_chars` characters (a single overlong word is cut mid-word).
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let budget = max_chars.saturating_sub(ELLIPSIS.len());
    let head: String = text.chars().take(budget).collect();
    let next_is_space = text.chars().nth(budget).is_some_and(char::is_whitespace);

    let cut = if next_is_space {
        head.as_str()
    } else {
        match head.rfind(char::is_whitespace) {
            Some(pos) if pos > 0 => &head[..pos],
            _ => head.as_str(),
        }
    };

    let cut = cut.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'));
    format!("{}{}", cut, ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        tokenize(text).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_tokenize_drops_punctuation() {
        assert_eq!(
            words("I love this new technology! It's amazing."),
            vec!["I", "love", "this", "new", "technology", "It's", "amazing"]
        );
    }

    #[test]
    fn test_tokenize_keeps_inner_hyphen_only() {
        assert_eq!(words("state-of-the-art - done-"), vec!["state-of-the-art", "done"]);
    }

    #[test]
    fn test_tokenize_normalizes_curly_apostrophe() {
        assert_eq!(words("don\u{2019}t"), vec!["don't"]);
    }

    #[test]
    fn test_token_indices_contiguous() {
        let tokens = tokenize("one, two; three");
        for (i, t) in tokens.iter().enumerate() {
            assert_eq!(t.index, i);
        }
    }

    #[test]
    fn test_split_sentences_basic() {
        let s = split_sentences("First one. Second one! Third?");
        assert_eq!(s, vec!["First one.", "Second one!", "Third?"]);
    }

    #[test]
    fn test_split_sentences_ignores_inner_dots() {
        let s = split_sentences("Version 2.5 shipped today. Great news.");
        assert_eq!(s, vec!["Version 2.5 shipped today.", "Great news."]);
    }

    #[test]
    fn test_split_sentences_groups_runs_and_quotes() {
        let s = split_sentences("Really?! \"Yes.\" Fine");
        assert_eq!(s, vec!["Really?!", "\"Yes.\"", "Fine"]);
    }

    #[test]
    fn test_split_sentences_no_terminal() {
        assert_eq!(split_sentences("  just words  "), vec!["just words"]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_truncate_fits() {
        assert_eq!(truncate_words("short text", 20), "short text");
    }

    #[test]
    fn test_truncate_at_word_boundary() {
        let out = truncate_words("The quick brown fox jumps over the lazy dog", 20);
        assert_eq!(out, "The quick brown...");
        assert!(out.chars().count() <= 20);
    }

    #[test]
    fn test_truncate_single_long_word() {
        let out = truncate_words("abcdefghijklmnopqrstuvwxyz", 10);
        assert_eq!(out, "abcdefg...");
    }

    #[test]
    fn test_truncate_multibyte() {
        let out = truncate_words("héllo wörld ünïcode strings here", 15);
        assert!(out.chars().count() <= 15);
        assert!(out.ends_with("..."));
    }
}
