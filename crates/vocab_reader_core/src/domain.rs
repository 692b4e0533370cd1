//! crates/vocab_reader_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// The set of normalized forms the user has marked as known.
pub type KnownWords = HashSet<String>;

/// A single vocabulary entry. `text` holds the normalized form and is unique
/// (case-insensitively) within a vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub id: Uuid,
    pub text: String,
    pub is_known: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Statistics derived from a document's content against a known-word snapshot.
///
/// `known_word_count + unknown_word_count == unique_word_count` always holds;
/// the analyzer is the only producer of this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub char_count: usize,
    pub unique_word_count: usize,
    pub known_word_count: usize,
    pub unknown_word_count: usize,
    pub difficulty_percentage: u8,
}

/// Represents a text document (a "book") uploaded by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub file_name: String,
    pub content: String,
    pub uploaded_at: DateTime<Utc>,
    pub stats: DocumentStats,
    pub folder_id: Option<Uuid>,
}

/// A named group of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// What happens to the documents of a folder when the folder is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderDeletePolicy {
    /// Documents are moved back to the root of the library.
    Orphan,
    /// Documents are deleted together with the folder.
    Cascade,
}

/// Where the user stopped reading a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingProgress {
    pub document_id: Uuid,
    pub scroll_offset: f64,
    pub last_read_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Justify,
    Right,
}

/// User-facing reader settings. Every field is mandatory; stored settings are
/// merged onto [`AppSettings::default`] once, when they are loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub highlight_color: String,
    pub api_key: String,
    pub font_size: u16,
    pub line_height: f32,
    pub letter_spacing: f32,
    pub word_spacing: f32,
    pub paragraph_spacing: u16,
    pub text_align: TextAlign,
    pub font_family: String,
    pub translation_icon_size: u16,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            highlight_color: "#3b82f6".to_string(),
            api_key: String::new(),
            font_size: 16,
            line_height: 1.6,
            letter_spacing: 0.0,
            word_spacing: 0.0,
            paragraph_spacing: 16,
            text_align: TextAlign::Left,
            font_family: "system-ui".to_string(),
            translation_icon_size: 24,
        }
    }
}

/// A request sent to the translation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TranslationRequest {
    /// Translate a single word in the context of its sentence.
    Word { word: String, sentence: String },
    /// Translate a whole sentence.
    Sentence { sentence: String },
    /// Free-form prompt, used for level analysis.
    General { text: String },
}

/// A vocabulary-level estimate for a batch of unknown words.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelAnalysis {
    pub level: String,
    pub description: String,
    pub examples: Vec<WordExample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordExample {
    pub word: String,
    pub translation: String,
    pub meaning: String,
}
