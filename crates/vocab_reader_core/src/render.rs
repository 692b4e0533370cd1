//! crates/vocab_reader_core/src/render.rs
//!
//! Maps document text onto the structure the reading view draws: lines, then
//! sentences, then words and the separators between them. Every character of
//! the input lands in exactly one segment, so joining the segment texts of a
//! line gives the line back.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::KnownWords;
use crate::normalize::{possessive_base, NormalizationMode};

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// A word as written. `normalized` may be empty, e.g. for a bare number.
    Word { normalized: String, known: bool },
    /// Whitespace, punctuation, brackets, dashes, or quotes between words.
    Separator,
    /// A run of `.`, `!`, `?`. `sentence` is the trimmed text it closes, if any.
    SentenceEnd { sentence: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSegment {
    pub text: String,
    pub kind: SegmentKind,
}

impl RenderSegment {
    pub fn is_sentence_boundary(&self) -> bool {
        matches!(self.kind, SegmentKind::SentenceEnd { .. })
    }

    /// Known/unknown verdict for words; `None` for every other segment.
    pub fn is_known_token(&self) -> Option<bool> {
        match &self.kind {
            SegmentKind::Word { known, .. } => Some(*known),
            _ => None,
        }
    }

    /// The sentence a boundary offers for translation.
    pub fn translatable_sentence(&self) -> Option<&str> {
        match &self.kind {
            SegmentKind::SentenceEnd { sentence } => sentence.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderLine {
    pub segments: Vec<RenderSegment>,
}

impl RenderLine {
    pub fn is_blank(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Lazily segments `content` line by line. Blank lines yield empty [`RenderLine`]s.
pub fn segment<'a>(
    content: &'a str,
    known: &'a KnownWords,
) -> impl Iterator<Item = RenderLine> + 'a {
    content.split('\n').map(move |line| segment_line(line, known))
}

pub fn segment_line(line: &str, known: &KnownWords) -> RenderLine {
    let mut segments = Vec::new();
    let mut last = 0;
    for end in SENTENCE_END.find_iter(line) {
        let sentence = &line[last..end.start()];
        push_words(&mut segments, sentence, known);

        let trimmed = sentence.trim();
        segments.push(RenderSegment {
            text: end.as_str().to_string(),
            kind: SegmentKind::SentenceEnd {
                sentence: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            },
        });
        last = end.end();
    }
    push_words(&mut segments, &line[last..], known);
    RenderLine { segments }
}

/// Whether the reading view highlights `word` as known.
pub fn is_known(word: &str, known: &KnownWords) -> bool {
    let normalized = NormalizationMode::Lenient.normalize(word);
    !normalized.is_empty() && verdict(&normalized, known)
}

fn verdict(normalized: &str, known: &KnownWords) -> bool {
    known.contains(normalized) || known.contains(possessive_base(normalized))
}

fn push_words(segments: &mut Vec<RenderSegment>, sentence: &str, known: &KnownWords) {
    let mut last = 0;
    // Sentence punctuation is already cut away, so only word separators match here.
    for separator in NormalizationMode::Lenient.separators().find_iter(sentence) {
        push_word(segments, &sentence[last..separator.start()], known);
        segments.push(RenderSegment {
            text: separator.as_str().to_string(),
            kind: SegmentKind::Separator,
        });
        last = separator.end();
    }
    push_word(segments, &sentence[last..], known);
}

fn push_word(segments: &mut Vec<RenderSegment>, word: &str, known: &KnownWords) {
    if word.is_empty() {
        return;
    }
    let normalized = NormalizationMode::Lenient.normalize(word);
    let is_known = !normalized.is_empty() && verdict(&normalized, known);
    segments.push(RenderSegment {
        text: word.to_string(),
        kind: SegmentKind::Word {
            normalized,
            known: is_known,
        },
    });
}
