//! crates/vocab_reader_core/src/normalize.rs
//!
//! The word-normalization policy shared by the statistics path and the reading view.
//!
//! Two modes exist and both live here so they cannot drift apart:
//!
//! - [`NormalizationMode::Strict`] feeds the difficulty analyzer. Quotes and every
//!   non-word character become whitespace, so `"Don't"` yields `don` and `t`.
//! - [`NormalizationMode::Lenient`] feeds the rendering mapper. It keeps apostrophes
//!   inside a word, so `"Don't"` yields `don't`.

use regex::Regex;
use std::sync::LazyLock;

/// Anything that is not a Unicode word character: whitespace, punctuation,
/// and every quote style (straight, typographic, angle, low-9).
static STRICT_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("static regex"));

/// Separator runs between words in the reading view. Sentence punctuation is
/// included, so the class also splits text the rendering mapper has already
/// cut at sentence ends.
static LENIENT_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\s,;:()\[\]{}"“”«»„—–.!?-]+"#).expect("static regex")
});

/// A leading non-word run, a trailing apostrophe, or an apostrophe followed by a non-letter.
static LENIENT_EDGES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\w]+|'$|'([^a-zA-Z])").expect("static regex"));

static LENIENT_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Zа-яА-ЯёЁ']").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationMode {
    /// Drops apostrophes; used for document statistics.
    Strict,
    /// Preserves apostrophes inside words; used for on-screen highlighting.
    Lenient,
}

impl NormalizationMode {
    /// The separator runs this mode splits text on.
    pub fn separators(self) -> &'static Regex {
        match self {
            NormalizationMode::Strict => &STRICT_SEPARATORS,
            NormalizationMode::Lenient => &LENIENT_SEPARATORS,
        }
    }

    /// Normalizes one token already cut by [`Self::separators`]. The result may be empty.
    pub fn normalize(self, token: &str) -> String {
        match self {
            NormalizationMode::Strict => token.to_lowercase(),
            NormalizationMode::Lenient => clean_token(token),
        }
    }

    /// Splits `text` into normalized words, in text order. Empty words are dropped.
    pub fn words(self, text: &str) -> Vec<String> {
        self.separators()
            .split(text)
            .map(|token| self.normalize(token))
            .filter(|word| !word.is_empty())
            .collect()
    }
}

/// Turns raw text into the normalized word sequence used for statistics.
pub fn tokenize(text: &str) -> Vec<String> {
    NormalizationMode::Strict.words(text)
}

/// Normalizes one already-separated token the way the reading view does.
///
/// The result may be empty (e.g. for a bare number).
pub fn clean_token(token: &str) -> String {
    let lowered = token.to_lowercase();
    let trimmed = LENIENT_EDGES.replace_all(&lowered, "${1}");
    LENIENT_DISALLOWED.replace_all(&trimmed, "").into_owned()
}

/// Strips the English possessive suffix (`'s`) from a lenient token.
pub fn possessive_base(word: &str) -> &str {
    word.strip_suffix("'s").unwrap_or(word)
}

/// Normalizes a word entered into the vocabulary: trimmed, lower-cased, and
/// stripped of surrounding punctuation.
pub fn normalize_entry(word: &str) -> String {
    word.trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}
