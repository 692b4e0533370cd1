//! crates/vocab_reader_core/src/analyzer.rs
//!
//! Difficulty analysis of a document against a known-word snapshot.
//!
//! The metric counts *unique* words: a word repeated a hundred times counts
//! once, so the score reflects vocabulary breadth rather than repetition.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::domain::{DocumentStats, KnownWords};
use crate::normalize::tokenize;

/// Characters of context kept on each side of a word in the learning queue.
const CONTEXT_RADIUS: usize = 100;

static LEARNABLE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z']{3,}\b").expect("static regex"));

/// Computes the statistics of `content` against `known`.
///
/// Pure; callers re-run it whenever the content or the known set changes.
pub fn analyze(content: &str, known: &KnownWords) -> DocumentStats {
    let unique: HashSet<String> = tokenize(content).into_iter().collect();
    let known_word_count = unique.iter().filter(|word| known.contains(*word)).count();
    let unknown_word_count = unique.len() - known_word_count;

    DocumentStats {
        char_count: content.chars().count(),
        unique_word_count: unique.len(),
        known_word_count,
        unknown_word_count,
        difficulty_percentage: difficulty_percentage(unknown_word_count, unique.len()),
    }
}

/// `round(unknown / total * 100)`, half-up; 0 when there are no words.
pub fn difficulty_percentage(unknown: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((unknown as f64 / total as f64) * 100.0).round() as u8
}

/// Unique unknown words of `content`, in order of first appearance.
pub fn unknown_words(content: &str, known: &KnownWords) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(content)
        .into_iter()
        .filter(|word| !known.contains(word) && seen.insert(word.clone()))
        .collect()
}

/// An unknown word together with the text surrounding one of its occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordInContext {
    pub word: String,
    pub context: String,
}

/// Every occurrence of an unknown, purely alphabetic word of at least three
/// ASCII letters, with up to 100 characters of context on each side.
pub fn learning_queue(content: &str, known: &KnownWords) -> Vec<WordInContext> {
    LEARNABLE_WORD
        .find_iter(content)
        .filter_map(|found| {
            let word = found.as_str().to_lowercase();
            if !word.chars().all(|c| c.is_ascii_alphabetic()) || known.contains(&word) {
                return None;
            }
            let start = content[..found.start()]
                .char_indices()
                .rev()
                .nth(CONTEXT_RADIUS - 1)
                .map_or(0, |(idx, _)| idx);
            let end = content[found.end()..]
                .char_indices()
                .nth(CONTEXT_RADIUS)
                .map_or(content.len(), |(idx, _)| found.end() + idx);
            Some(WordInContext {
                word,
                context: content[start..end].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(words: &[&str]) -> KnownWords {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn counts_unique_words_against_known_set() {
        let stats = analyze("The quick, quick fox.", &known(&["the", "quick"]));
        assert_eq!(stats.unique_word_count, 3);
        assert_eq!(stats.known_word_count, 2);
        assert_eq!(stats.unknown_word_count, 1);
        assert_eq!(stats.difficulty_percentage, 33);
        assert_eq!(stats.char_count, 21);
    }

    #[test]
    fn empty_content_has_zero_difficulty() {
        let stats = analyze("", &known(&["anything"]));
        assert_eq!(stats, DocumentStats::default());
    }

    #[test]
    fn known_and_unknown_always_sum_to_unique() {
        let samples = [
            "One two three, one two.",
            "Don't stop! Don't.",
            "«Привет» мир, hello world",
            "   \n\n  ",
        ];
        let set = known(&["one", "don", "мир", "hello"]);
        for sample in samples {
            let stats = analyze(sample, &set);
            assert_eq!(
                stats.known_word_count + stats.unknown_word_count,
                stats.unique_word_count,
                "sample {sample:?}"
            );
        }
    }

    #[test]
    fn char_count_is_independent_of_tokenization() {
        let stats = analyze("ёж!!", &KnownWords::new());
        assert_eq!(stats.char_count, 4);
        assert_eq!(stats.unique_word_count, 1);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(difficulty_percentage(1, 8), 13);
        assert_eq!(difficulty_percentage(1, 200), 1);
        assert_eq!(difficulty_percentage(2, 3), 67);
        assert_eq!(difficulty_percentage(0, 0), 0);
        assert_eq!(difficulty_percentage(5, 5), 100);
    }

    #[test]
    fn unknown_words_keep_first_appearance_order() {
        let words = unknown_words("Zeta alpha zeta beta the", &known(&["the"]));
        assert_eq!(words, vec!["zeta", "alpha", "beta"]);
    }

    #[test]
    fn learning_queue_skips_short_known_and_apostrophe_words() {
        let queue = learning_queue("An owl can't hoot. The owl sleeps.", &known(&["the"]));
        let words: Vec<&str> = queue.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["owl", "hoot", "owl", "sleeps"]);
        assert_eq!(queue[0].context, "An owl can't hoot. The owl sleeps.");
    }

    #[test]
    fn learning_queue_limits_context_window() {
        let padding = "x ".repeat(80);
        let content = format!("{padding}target {padding}");
        let queue = learning_queue(&content, &KnownWords::new());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].context.chars().count(), 100 + "target".len() + 100);
    }
}
