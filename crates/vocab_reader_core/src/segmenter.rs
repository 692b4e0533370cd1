//! crates/vocab_reader_core/src/segmenter.rs
//!
//! Splits a long document into ordered parts near a target size.
//!
//! # Algorithm
//!
//! Boundaries are chosen greedily from a cursor, measuring in characters:
//!
//! 1. The candidate end is `cursor + target`, clamped to the content length.
//! 2. Before the end of the content, the nearest paragraph break (`\n\n`) at or
//!    before the candidate end wins if it lies at least `0.5 * target` past the
//!    cursor. The break is consumed with the part.
//! 3. Otherwise the latest sentence terminator (`. `, `! `, `? `) wins if it lies
//!    at least `0.7 * target` past the cursor; the cut falls right after the
//!    punctuation mark.
//! 4. Otherwise the part ends exactly at the candidate end.
//!
//! Parts are trimmed; a part that trims to nothing is dropped but its span is
//! still consumed. Only whitespace is ever lost between parts.

use chrono::{DateTime, Utc};
use std::num::NonZeroUsize;
use uuid::Uuid;

use crate::analyzer::analyze;
use crate::domain::{Document, Folder, KnownWords};
use crate::ports::PortError;

const PARAGRAPH_BREAK: &str = "\n\n";
const SENTENCE_TERMINATORS: [&str; 3] = [". ", "! ", "? "];
const PARAGRAPH_MIN_RATIO: f64 = 0.5;
const SENTENCE_MIN_RATIO: f64 = 0.7;
const FOLDER_NAME_MAX_CHARS: usize = 27;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("cannot split a document without content")]
    EmptyContent,
}

impl From<SplitError> for PortError {
    fn from(err: SplitError) -> Self {
        PortError::InvalidInput(err.to_string())
    }
}

/// The result of a split: a new folder and the parts placed inside it.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub folder: Folder,
    pub parts: Vec<Document>,
}

/// Splits `document` into parts of roughly `target` characters, analyzing each
/// part against `known`. The source document itself is not modified.
pub fn split_document(
    document: &Document,
    target: NonZeroUsize,
    known: &KnownWords,
    now: DateTime<Utc>,
) -> Result<SplitOutcome, SplitError> {
    let pieces = split_content(&document.content, target);
    if pieces.is_empty() {
        return Err(SplitError::EmptyContent);
    }

    let folder = Folder {
        id: Uuid::new_v4(),
        name: folder_name(&document.title),
        created_at: now,
    };
    let total = pieces.len();
    let parts = pieces
        .into_iter()
        .enumerate()
        .map(|(idx, piece)| {
            let title = format!("{} ({}/{})", document.title, idx + 1, total);
            Document {
                id: Uuid::new_v4(),
                file_name: format!("{title}.txt"),
                title,
                content: piece.to_string(),
                uploaded_at: now,
                stats: analyze(piece, known),
                folder_id: Some(folder.id),
            }
        })
        .collect();

    Ok(SplitOutcome { folder, parts })
}

/// Boundary selection only: returns the trimmed, non-empty parts of `content` in order.
pub fn split_content(content: &str, target: NonZeroUsize) -> Vec<&str> {
    let index = CharIndex::new(content);
    let mut parts = Vec::new();
    let mut cursor = 0;
    while cursor < index.len() {
        let cut = next_cut(&index, cursor, target.get());
        let part = index.slice(cursor, cut).trim();
        if !part.is_empty() {
            parts.push(part);
        }
        cursor = cut;
    }
    parts
}

/// Name of the folder holding the parts: the source title, truncated.
pub fn folder_name(title: &str) -> String {
    if title.chars().count() > FOLDER_NAME_MAX_CHARS {
        let prefix: String = title.chars().take(FOLDER_NAME_MAX_CHARS).collect();
        format!("{prefix}...")
    } else {
        title.to_string()
    }
}

fn next_cut(index: &CharIndex<'_>, cursor: usize, target: usize) -> usize {
    let len = index.len();
    let end = cursor.saturating_add(target).min(len);
    if end >= len {
        return len;
    }

    // A boundary may start at `end` itself, so the window reaches past it by
    // the length of the two-character patterns.
    let window_start = index.byte(cursor);
    let window = index.slice(cursor, (end + 2).min(len));
    let to_char = |byte: usize| index.char_at_byte(window_start + byte);
    let far_enough = |at: usize, ratio: f64| at as f64 >= cursor as f64 + ratio * target as f64;

    if let Some(at) = window.rfind(PARAGRAPH_BREAK).map(to_char) {
        if far_enough(at, PARAGRAPH_MIN_RATIO) {
            return at + PARAGRAPH_BREAK.len();
        }
    }

    let terminator = SENTENCE_TERMINATORS
        .iter()
        .filter_map(|pattern| window.rfind(pattern))
        .max()
        .map(to_char);
    if let Some(at) = terminator {
        if far_enough(at, SENTENCE_MIN_RATIO) {
            return at + 1;
        }
    }

    end
}

/// Maps between character positions and byte offsets of a string.
struct CharIndex<'a> {
    text: &'a str,
    offsets: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    fn new(text: &'a str) -> Self {
        let offsets = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();
        Self { text, offsets }
    }

    fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn byte(&self, char_pos: usize) -> usize {
        self.offsets[char_pos]
    }

    fn char_at_byte(&self, byte: usize) -> usize {
        self.offsets.partition_point(|&offset| offset < byte)
    }

    fn slice(&self, from: usize, to: usize) -> &'a str {
        &self.text[self.byte(from)..self.byte(to)]
    }
}
