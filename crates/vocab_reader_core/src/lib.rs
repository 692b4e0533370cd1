pub mod analyzer;
pub mod domain;
pub mod normalize;
pub mod ports;
pub mod render;
pub mod segmenter;
pub mod stats;
pub mod vocabulary;

pub use analyzer::{analyze, learning_queue, unknown_words, WordInContext};
pub use domain::{
    AppSettings, Document, DocumentStats, Folder, FolderDeletePolicy, KnownWords, LevelAnalysis,
    ReadingProgress, TextAlign, TranslationRequest, Word, WordExample,
};
pub use normalize::{tokenize, NormalizationMode};
pub use ports::{KeyValueStore, PortError, PortResult, TranslationService};
pub use render::{segment, RenderLine, RenderSegment, SegmentKind};
pub use segmenter::{split_document, SplitError, SplitOutcome};
pub use stats::{recompute_all, LibraryOverview};
pub use vocabulary::{Vocabulary, VocabularyError};
