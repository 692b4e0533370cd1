//! crates/vocab_reader_core/src/vocabulary.rs
//!
//! The user's personal vocabulary: one entry per normalized form, each marked
//! known or still being learned. Persistence is the caller's concern; this type
//! only holds the in-memory snapshot and enforces its invariants.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{KnownWords, Word};
use crate::normalize::normalize_entry;
use crate::ports::PortError;

const KNOWN_SECTION: &str = "# Known words";
const LEARNING_SECTION: &str = "# Learning words";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("the word is empty after normalization")]
    EmptyWord,
    #[error("'{0}' is already in the vocabulary")]
    AlreadyTracked(String),
}

impl From<VocabularyError> for PortError {
    fn from(err: VocabularyError) -> Self {
        match err {
            VocabularyError::EmptyWord => PortError::InvalidInput(err.to_string()),
            VocabularyError::AlreadyTracked(_) => PortError::Conflict(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    words: Vec<Word>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a vocabulary from stored entries. Later duplicates of a
    /// normalized form are dropped so the uniqueness invariant holds.
    pub fn from_words(words: Vec<Word>) -> Self {
        let mut vocabulary = Self::new();
        for word in words {
            if vocabulary.position(&word.text.to_lowercase()).is_none() {
                vocabulary.words.push(word);
            }
        }
        vocabulary
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn into_words(self) -> Vec<Word> {
        self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&Word> {
        self.position(&normalize_entry(word)).map(|idx| &self.words[idx])
    }

    /// Snapshot of the normalized forms marked known.
    pub fn known_words(&self) -> KnownWords {
        self.words
            .iter()
            .filter(|w| w.is_known)
            .map(|w| w.text.to_lowercase())
            .collect()
    }

    /// Inserts or updates the entry for `word`. Repeating the call with the same
    /// flag only refreshes `updated_at`.
    pub fn upsert(
        &mut self,
        word: &str,
        is_known: bool,
        now: DateTime<Utc>,
    ) -> Result<&Word, VocabularyError> {
        let normalized = normalize_entry(word);
        if normalized.is_empty() {
            return Err(VocabularyError::EmptyWord);
        }
        let idx = match self.position(&normalized) {
            Some(idx) => {
                let entry = &mut self.words[idx];
                entry.is_known = is_known;
                entry.updated_at = now;
                idx
            }
            None => {
                self.words.push(new_word(normalized, is_known, now));
                self.words.len() - 1
            }
        };
        Ok(&self.words[idx])
    }

    /// Adds `word` as known. Unlike [`Vocabulary::upsert`], an already tracked
    /// word is rejected instead of updated.
    pub fn add(&mut self, word: &str, now: DateTime<Utc>) -> Result<&Word, VocabularyError> {
        let normalized = normalize_entry(word);
        if normalized.is_empty() {
            return Err(VocabularyError::EmptyWord);
        }
        if self.position(&normalized).is_some() {
            return Err(VocabularyError::AlreadyTracked(normalized));
        }
        self.words.push(new_word(normalized, true, now));
        Ok(&self.words[self.words.len() - 1])
    }

    /// Adds every word not yet tracked as known and returns how many were added.
    /// Existing entries keep their state, whether known or not.
    pub fn bulk_import<I, S>(&mut self, words: I, now: DateTime<Utc>) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for word in words {
            let normalized = normalize_entry(word.as_ref());
            if normalized.is_empty() || self.position(&normalized).is_some() {
                continue;
            }
            self.words.push(new_word(normalized, true, now));
            added += 1;
        }
        added
    }

    /// Flips the known flag of the entry with `id`.
    pub fn toggle(&mut self, id: Uuid, now: DateTime<Utc>) -> Option<&Word> {
        let entry = self.words.iter_mut().find(|w| w.id == id)?;
        entry.is_known = !entry.is_known;
        entry.updated_at = now;
        Some(&*entry)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Word> {
        let idx = self.words.iter().position(|w| w.id == id)?;
        Some(self.words.remove(idx))
    }

    /// Plain-text export: known words first, then words still being learned.
    pub fn export_text(&self) -> String {
        let known = self.words.iter().filter(|w| w.is_known).map(|w| w.text.as_str());
        let learning = self.words.iter().filter(|w| !w.is_known).map(|w| w.text.as_str());

        let mut lines = vec![KNOWN_SECTION];
        lines.extend(known);
        lines.push("");
        lines.push(LEARNING_SECTION);
        lines.extend(learning);
        lines.join("\n")
    }

    fn position(&self, normalized: &str) -> Option<usize> {
        self.words
            .iter()
            .position(|w| w.text.to_lowercase() == normalized)
    }
}

/// Parses a dictionary file: one word per line, blank lines ignored.
pub fn parse_word_list(text: &str) -> Vec<String> {
    text.lines()
        .map(normalize_entry)
        .filter(|word| !word.is_empty())
        .collect()
}

fn new_word(text: String, is_known: bool, now: DateTime<Utc>) -> Word {
    Word {
        id: Uuid::new_v4(),
        text,
        is_known,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn repeated_upsert_keeps_one_entry() {
        let mut vocabulary = Vocabulary::new();
        let t0 = Utc::now();
        vocabulary.upsert("Word", true, t0).unwrap();
        let second = vocabulary.upsert("word", true, t0 + Duration::seconds(5)).unwrap();
        assert_eq!(second.updated_at, t0 + Duration::seconds(5));
        assert_eq!(second.created_at, t0);
        assert_eq!(vocabulary.len(), 1);
    }

    #[test]
    fn upsert_updates_known_flag() {
        let mut vocabulary = Vocabulary::new();
        let now = Utc::now();
        vocabulary.upsert("cat", false, now).unwrap();
        assert!(vocabulary.known_words().is_empty());
        vocabulary.upsert("CAT", true, now).unwrap();
        assert!(vocabulary.known_words().contains("cat"));
    }

    #[test]
    fn upsert_rejects_empty_words() {
        let mut vocabulary = Vocabulary::new();
        assert_eq!(
            vocabulary.upsert(" !? ", true, Utc::now()).unwrap_err(),
            VocabularyError::EmptyWord
        );
    }

    #[test]
    fn import_adds_only_new_words_as_known() {
        let mut vocabulary = Vocabulary::new();
        let words = parse_word_list("Apple\napple\nBANANA\n\n");
        assert_eq!(vocabulary.bulk_import(words, Utc::now()), 2);
        assert_eq!(vocabulary.len(), 2);
        assert!(vocabulary.words().iter().all(|w| w.is_known));
        assert!(vocabulary.get("apple").is_some());
        assert!(vocabulary.get("banana").is_some());
    }

    #[test]
    fn import_never_touches_tracked_words() {
        let mut vocabulary = Vocabulary::new();
        let now = Utc::now();
        vocabulary.upsert("learning", false, now).unwrap();
        let added = vocabulary.bulk_import(["learning", "fresh"], now);
        assert_eq!(added, 1);
        assert_eq!(vocabulary.len(), 2);
        assert!(!vocabulary.get("learning").unwrap().is_known);
    }

    #[test]
    fn add_rejects_tracked_words() {
        let mut vocabulary = Vocabulary::new();
        let now = Utc::now();
        vocabulary.add("Hello", now).unwrap();
        assert_eq!(
            vocabulary.add("hello", now).unwrap_err(),
            VocabularyError::AlreadyTracked("hello".to_string())
        );
    }

    #[test]
    fn toggle_and_remove_by_id() {
        let mut vocabulary = Vocabulary::new();
        let now = Utc::now();
        let id = vocabulary.upsert("tree", true, now).unwrap().id;
        assert!(!vocabulary.toggle(id, now).unwrap().is_known);
        assert_eq!(vocabulary.remove(id).unwrap().text, "tree");
        assert!(vocabulary.toggle(id, now).is_none());
        assert!(vocabulary.is_empty());
    }

    #[test]
    fn from_words_drops_duplicate_forms() {
        let now = Utc::now();
        let vocabulary = Vocabulary::from_words(vec![
            new_word("sun".into(), true, now),
            new_word("Sun".into(), false, now),
        ]);
        assert_eq!(vocabulary.len(), 1);
        assert!(vocabulary.words()[0].is_known);
    }

    #[test]
    fn loaded_duplicates_do_not_shadow_upserts() {
        let now = Utc::now();
        let mut vocabulary = Vocabulary::from_words(vec![
            new_word("Moon".into(), false, now),
            new_word("moon".into(), false, now),
        ]);
        vocabulary.upsert("moon", true, now).unwrap();
        assert_eq!(vocabulary.len(), 1);
        assert!(vocabulary.known_words().contains("moon"));
    }

    #[test]
    fn export_lists_known_then_learning() {
        let mut vocabulary = Vocabulary::new();
        let now = Utc::now();
        vocabulary.upsert("alpha", true, now).unwrap();
        vocabulary.upsert("beta", false, now).unwrap();
        vocabulary.upsert("gamma", true, now).unwrap();
        assert_eq!(
            vocabulary.export_text(),
            "# Known words\nalpha\ngamma\n\n# Learning words\nbeta"
        );
    }
}
