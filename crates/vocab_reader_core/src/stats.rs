//! crates/vocab_reader_core/src/stats.rs
//!
//! Keeps the cached per-document statistics consistent with the vocabulary.

use crate::analyzer::{analyze, difficulty_percentage};
use crate::domain::{Document, KnownWords, Word};

/// Replaces the statistics of every document with a fresh analysis against `known`.
///
/// Every document is re-analyzed; nothing else about a document changes.
pub fn recompute_all(mut documents: Vec<Document>, known: &KnownWords) -> Vec<Document> {
    recompute_in_place(&mut documents, known);
    documents
}

pub fn recompute_in_place(documents: &mut [Document], known: &KnownWords) {
    for document in documents.iter_mut() {
        document.stats = analyze(&document.content, known);
    }
}

/// Library-wide totals shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LibraryOverview {
    pub total_documents: usize,
    pub total_unique_words: usize,
    pub known_words: usize,
    pub dictionary_words: usize,
    pub average_difficulty: u8,
    pub known_word_percentage: u8,
}

impl LibraryOverview {
    pub fn compute(documents: &[Document], words: &[Word]) -> Self {
        let total_documents = documents.len();
        let known_words = words.iter().filter(|w| w.is_known).count();
        let difficulty_sum: usize = documents
            .iter()
            .map(|d| d.stats.difficulty_percentage as usize)
            .sum();
        let average_difficulty = if total_documents == 0 {
            0
        } else {
            (difficulty_sum as f64 / total_documents as f64).round() as u8
        };

        Self {
            total_documents,
            total_unique_words: documents.iter().map(|d| d.stats.unique_word_count).sum(),
            known_words,
            dictionary_words: words.len(),
            average_difficulty,
            // Same share-of-total rounding as the difficulty score.
            known_word_percentage: difficulty_percentage(known_words, words.len()),
        }
    }
}
