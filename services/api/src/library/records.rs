//! services/api/src/library/records.rs
//!
//! "Impure" serialization records for everything the library persists. The
//! JSON layout (camelCase, one array per key) is the stored format; the same
//! records double as HTTP bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use vocab_reader_core::domain::{
    AppSettings, Document, DocumentStats, Folder, LevelAnalysis, ReadingProgress, TextAlign, Word,
    WordExample,
};
use vocab_reader_core::render::{RenderLine, RenderSegment};
use vocab_reader_core::stats::LibraryOverview;
use vocab_reader_core::WordInContext;

//=========================================================================================
// Persisted Records
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
    pub char_count: usize,
    #[serde(default)]
    pub unique_words: usize,
    pub known_words: usize,
    pub unknown_words: usize,
    pub difficulty_percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<Uuid>,
}

impl BookRecord {
    pub fn from_domain(document: &Document) -> Self {
        Self {
            id: document.id,
            title: document.title.clone(),
            content: document.content.clone(),
            file_name: document.file_name.clone(),
            upload_date: document.uploaded_at,
            char_count: document.stats.char_count,
            unique_words: document.stats.unique_word_count,
            known_words: document.stats.known_word_count,
            unknown_words: document.stats.unknown_word_count,
            difficulty_percentage: document.stats.difficulty_percentage,
            folder_id: document.folder_id,
        }
    }

    pub fn to_domain(self) -> Document {
        Document {
            id: self.id,
            title: self.title,
            content: self.content,
            file_name: self.file_name,
            uploaded_at: self.upload_date,
            stats: DocumentStats {
                char_count: self.char_count,
                // Older entries lack the derived total.
                unique_word_count: self.known_words + self.unknown_words,
                known_word_count: self.known_words,
                unknown_word_count: self.unknown_words,
                difficulty_percentage: self.difficulty_percentage,
            },
            folder_id: self.folder_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryWordRecord {
    pub id: Uuid,
    pub word: String,
    pub is_known: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DictionaryWordRecord {
    pub fn from_domain(word: &Word) -> Self {
        Self {
            id: word.id,
            word: word.text.clone(),
            is_known: word.is_known,
            created_at: word.created_at,
            updated_at: word.updated_at,
        }
    }

    pub fn to_domain(self) -> Word {
        Word {
            id: self.id,
            text: self.word,
            is_known: self.is_known,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderRecord {
    pub id: Uuid,
    pub name: String,
    pub created_date: DateTime<Utc>,
}

impl FolderRecord {
    pub fn from_domain(folder: &Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            created_date: folder.created_at,
        }
    }

    pub fn to_domain(self) -> Folder {
        Folder {
            id: self.id,
            name: self.name,
            created_at: self.created_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub book_id: Uuid,
    pub current_position: f64,
    pub last_read_date: DateTime<Utc>,
}

impl ProgressRecord {
    pub fn from_domain(progress: &ReadingProgress) -> Self {
        Self {
            book_id: progress.document_id,
            current_position: progress.scroll_offset,
            last_read_date: progress.last_read_at,
        }
    }

    pub fn to_domain(self) -> ReadingProgress {
        ReadingProgress {
            document_id: self.book_id,
            scroll_offset: self.current_position,
            last_read_at: self.last_read_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignRecord {
    Left,
    Center,
    Justify,
    Right,
}

impl From<TextAlign> for TextAlignRecord {
    fn from(align: TextAlign) -> Self {
        match align {
            TextAlign::Left => Self::Left,
            TextAlign::Center => Self::Center,
            TextAlign::Justify => Self::Justify,
            TextAlign::Right => Self::Right,
        }
    }
}

impl From<TextAlignRecord> for TextAlign {
    fn from(align: TextAlignRecord) -> Self {
        match align {
            TextAlignRecord::Left => Self::Left,
            TextAlignRecord::Center => Self::Center,
            TextAlignRecord::Justify => Self::Justify,
            TextAlignRecord::Right => Self::Right,
        }
    }
}

/// Complete settings, as returned to clients and accepted on update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub highlight_color: String,
    pub groq_api_key: String,
    pub font_size: u16,
    pub line_height: f32,
    pub letter_spacing: f32,
    pub word_spacing: f32,
    pub paragraph_spacing: u16,
    pub text_align: TextAlignRecord,
    pub font_family: String,
    pub translation_icon_size: u16,
}

impl SettingsRecord {
    pub fn from_domain(settings: &AppSettings) -> Self {
        Self {
            highlight_color: settings.highlight_color.clone(),
            groq_api_key: settings.api_key.clone(),
            font_size: settings.font_size,
            line_height: settings.line_height,
            letter_spacing: settings.letter_spacing,
            word_spacing: settings.word_spacing,
            paragraph_spacing: settings.paragraph_spacing,
            text_align: settings.text_align.into(),
            font_family: settings.font_family.clone(),
            translation_icon_size: settings.translation_icon_size,
        }
    }

    pub fn to_domain(self) -> AppSettings {
        AppSettings {
            highlight_color: self.highlight_color,
            api_key: self.groq_api_key,
            font_size: self.font_size,
            line_height: self.line_height,
            letter_spacing: self.letter_spacing,
            word_spacing: self.word_spacing,
            paragraph_spacing: self.paragraph_spacing,
            text_align: self.text_align.into(),
            font_family: self.font_family,
            translation_icon_size: self.translation_icon_size,
        }
    }
}

/// Settings as found in storage: any field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredSettings {
    highlight_color: Option<String>,
    groq_api_key: Option<String>,
    font_size: Option<u16>,
    line_height: Option<f32>,
    letter_spacing: Option<f32>,
    word_spacing: Option<f32>,
    paragraph_spacing: Option<u16>,
    text_align: Option<TextAlignRecord>,
    font_family: Option<String>,
    translation_icon_size: Option<u16>,
}

impl StoredSettings {
    /// Stored values win; every missing field takes its default.
    pub fn merge_onto(self, defaults: AppSettings) -> AppSettings {
        AppSettings {
            highlight_color: self.highlight_color.unwrap_or(defaults.highlight_color),
            api_key: self.groq_api_key.unwrap_or(defaults.api_key),
            font_size: self.font_size.unwrap_or(defaults.font_size),
            line_height: self.line_height.unwrap_or(defaults.line_height),
            letter_spacing: self.letter_spacing.unwrap_or(defaults.letter_spacing),
            word_spacing: self.word_spacing.unwrap_or(defaults.word_spacing),
            paragraph_spacing: self.paragraph_spacing.unwrap_or(defaults.paragraph_spacing),
            text_align: self.text_align.map_or(defaults.text_align, Into::into),
            font_family: self.font_family.unwrap_or(defaults.font_family),
            translation_icon_size: self
                .translation_icon_size
                .unwrap_or(defaults.translation_icon_size),
        }
    }
}

//=========================================================================================
// Response-only Records
//=========================================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewRecord {
    pub total_books: usize,
    pub total_unique_words: usize,
    pub known_words: usize,
    pub dictionary_words: usize,
    pub average_difficulty: u8,
    pub known_word_percentage: u8,
}

impl From<LibraryOverview> for OverviewRecord {
    fn from(overview: LibraryOverview) -> Self {
        Self {
            total_books: overview.total_documents,
            total_unique_words: overview.total_unique_words,
            known_words: overview.known_words,
            dictionary_words: overview.dictionary_words,
            average_difficulty: overview.average_difficulty,
            known_word_percentage: overview.known_word_percentage,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRecord {
    pub text: String,
    pub is_sentence_boundary: bool,
    pub is_known_token: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence: Option<String>,
}

impl From<RenderSegment> for SegmentRecord {
    fn from(segment: RenderSegment) -> Self {
        Self {
            is_sentence_boundary: segment.is_sentence_boundary(),
            is_known_token: segment.is_known_token(),
            sentence: segment.translatable_sentence().map(str::to_owned),
            text: segment.text,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LineRecord {
    pub segments: Vec<SegmentRecord>,
}

impl From<RenderLine> for LineRecord {
    fn from(line: RenderLine) -> Self {
        Self {
            segments: line.segments.into_iter().map(SegmentRecord::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WordInContextRecord {
    pub word: String,
    pub context: String,
}

impl From<WordInContext> for WordInContextRecord {
    fn from(item: WordInContext) -> Self {
        Self {
            word: item.word,
            context: item.context,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WordExampleRecord {
    pub word: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub meaning: String,
}

/// Level analysis as the provider is asked to reply, and as clients receive it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LevelAnalysisRecord {
    pub level: String,
    pub description: String,
    #[serde(default)]
    pub examples: Vec<WordExampleRecord>,
}

impl LevelAnalysisRecord {
    pub fn from_domain(analysis: &LevelAnalysis) -> Self {
        Self {
            level: analysis.level.clone(),
            description: analysis.description.clone(),
            examples: analysis
                .examples
                .iter()
                .map(|e| WordExampleRecord {
                    word: e.word.clone(),
                    translation: e.translation.clone(),
                    meaning: e.meaning.clone(),
                })
                .collect(),
        }
    }

    pub fn to_domain(self) -> LevelAnalysis {
        LevelAnalysis {
            level: self.level,
            description: self.description,
            examples: self
                .examples
                .into_iter()
                .map(|e| WordExample {
                    word: e.word,
                    translation: e.translation,
                    meaning: e.meaning,
                })
                .collect(),
        }
    }
}
