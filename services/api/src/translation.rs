//! services/api/src/translation.rs
//!
//! Coordinates calls to the translation provider: result caching, duplicate
//! suppression for requests already in flight, the single automatic retry on
//! rate limiting, and the level analysis built on top of free-form prompts.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, warn};
use vocab_reader_core::analyzer::unknown_words;
use vocab_reader_core::domain::{KnownWords, LevelAnalysis, TranslationRequest};
use vocab_reader_core::ports::{PortError, PortResult, TranslationService};

use crate::library::records::LevelAnalysisRecord;

/// Word translations are reused for a day; sentence translations for the
/// lifetime of the process.
pub const WORD_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Unknown words sent per level-analysis request.
pub const LEVEL_BATCH_SIZE: usize = 50;

static SENTENCE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^.*?:\s*["']?"#).expect("static regex"));
static SENTENCE_TRAILER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']?\s*$"#).expect("static regex"));

/// Identity shared by the result cache and the in-flight set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TranslationKey {
    Word { word: String, sentence: String },
    Sentence(String),
}

impl TranslationKey {
    /// Free-form requests are neither cached nor deduplicated.
    pub fn for_request(request: &TranslationRequest) -> Option<Self> {
        match request {
            TranslationRequest::Word { word, sentence } => Some(Self::Word {
                word: word.to_lowercase(),
                sentence: sentence.clone(),
            }),
            TranslationRequest::Sentence { sentence } => Some(Self::Sentence(sentence.clone())),
            TranslationRequest::General { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Ready(String),
    /// The same request is already being translated.
    Pending,
}

struct CachedTranslation {
    text: String,
    stored_at: Instant,
}

#[derive(Default)]
struct CoordinatorState {
    cache: HashMap<TranslationKey, CachedTranslation>,
    in_flight: HashSet<TranslationKey>,
}

impl CoordinatorState {
    fn cached(&self, key: &TranslationKey, word_ttl: Duration) -> Option<String> {
        self.cache
            .get(key)
            .filter(|hit| is_fresh(key, hit, word_ttl))
            .map(|hit| hit.text.clone())
    }

    /// Caches `text`, dropping every entry that has expired in the meantime.
    fn store(&mut self, key: TranslationKey, text: String, word_ttl: Duration) {
        self.cache.retain(|key, hit| is_fresh(key, hit, word_ttl));
        self.cache.insert(
            key,
            CachedTranslation {
                text,
                stored_at: Instant::now(),
            },
        );
    }
}

fn is_fresh(key: &TranslationKey, hit: &CachedTranslation, word_ttl: Duration) -> bool {
    match key {
        TranslationKey::Word { .. } => hit.stored_at.elapsed() < word_ttl,
        TranslationKey::Sentence(_) => true,
    }
}

pub struct TranslationCoordinator {
    translator: Arc<dyn TranslationService>,
    retry_delay: Duration,
    word_ttl: Duration,
    state: Arc<Mutex<CoordinatorState>>,
}

impl TranslationCoordinator {
    pub fn new(translator: Arc<dyn TranslationService>, retry_delay: Duration) -> Self {
        Self {
            translator,
            retry_delay,
            word_ttl: WORD_CACHE_TTL,
            state: Arc::new(Mutex::new(CoordinatorState::default())),
        }
    }

    pub fn with_word_ttl(mut self, word_ttl: Duration) -> Self {
        self.word_ttl = word_ttl;
        self
    }

    pub async fn request(
        &self,
        api_key: &str,
        request: &TranslationRequest,
    ) -> PortResult<TranslationOutcome> {
        if api_key.trim().is_empty() {
            return Err(PortError::MissingCredential);
        }
        let Some(key) = TranslationKey::for_request(request) else {
            return call_with_retry(self.translator.as_ref(), self.retry_delay, api_key, request)
                .await
                .map(TranslationOutcome::Ready);
        };

        {
            let mut state = self.state.lock().await;
            if let Some(text) = state.cached(&key, self.word_ttl) {
                debug!("Translation cache hit for {:?}", key);
                return Ok(TranslationOutcome::Ready(text));
            }
            if !state.in_flight.insert(key.clone()) {
                debug!("Suppressing duplicate translation request for {:?}", key);
                return Ok(TranslationOutcome::Pending);
            }
        }

        // Detached, so a caller that goes away cannot leave the key marked in flight.
        let task = tokio::spawn(resolve(
            self.translator.clone(),
            self.state.clone(),
            self.retry_delay,
            self.word_ttl,
            api_key.to_string(),
            request.clone(),
            key.clone(),
        ));
        match task.await {
            Ok(result) => result.map(TranslationOutcome::Ready),
            Err(e) => {
                self.state.lock().await.in_flight.remove(&key);
                Err(PortError::Unexpected(format!("Translation task failed: {}", e)))
            }
        }
    }

    /// Estimates the level of one batch of a document's unknown words.
    ///
    /// `batch` is zero-based. A reply that is not the requested JSON is kept
    /// as a plain description.
    pub async fn analyze_level(
        &self,
        api_key: &str,
        content: &str,
        known: &KnownWords,
        batch: usize,
    ) -> PortResult<LevelAnalysis> {
        let words: Vec<String> = unknown_words(content, known)
            .into_iter()
            .skip(batch.saturating_mul(LEVEL_BATCH_SIZE))
            .take(LEVEL_BATCH_SIZE)
            .collect();
        if words.is_empty() {
            return Ok(LevelAnalysis {
                level: "No unknown words".to_string(),
                description: "Every word in this book is already known.".to_string(),
                examples: Vec::new(),
            });
        }
        if api_key.trim().is_empty() {
            return Err(PortError::MissingCredential);
        }

        let request = TranslationRequest::General {
            text: level_prompt(&words),
        };
        let reply =
            call_with_retry(self.translator.as_ref(), self.retry_delay, api_key, &request).await?;
        Ok(parse_level_reply(&reply))
    }
}

/// Calls the provider for an in-flight key, then caches the result on success
/// and clears the mark either way.
async fn resolve(
    translator: Arc<dyn TranslationService>,
    state: Arc<Mutex<CoordinatorState>>,
    retry_delay: Duration,
    word_ttl: Duration,
    api_key: String,
    request: TranslationRequest,
    key: TranslationKey,
) -> PortResult<String> {
    let result = call_with_retry(translator.as_ref(), retry_delay, &api_key, &request)
        .await
        .map(|raw| clean_reply(&request, raw));

    let mut state = state.lock().await;
    state.in_flight.remove(&key);
    match result {
        Ok(text) => {
            state.store(key, text.clone(), word_ttl);
            Ok(text)
        }
        Err(e) => {
            error!("Translation failed for {:?}: {}", key, e);
            Err(e)
        }
    }
}

async fn call_with_retry(
    translator: &dyn TranslationService,
    retry_delay: Duration,
    api_key: &str,
    request: &TranslationRequest,
) -> PortResult<String> {
    match translator.translate(api_key, request).await {
        Err(PortError::RateLimited) => {
            warn!(
                "Rate limited by the translation provider, retrying in {:?}",
                retry_delay
            );
            tokio::time::sleep(retry_delay).await;
            translator.translate(api_key, request).await
        }
        other => other,
    }
}

/// Sentence replies often arrive as `Translation: "..."`; keep only the text.
fn clean_reply(request: &TranslationRequest, raw: String) -> String {
    match request {
        TranslationRequest::Sentence { .. } => {
            let unlabeled = SENTENCE_LABEL.replace(&raw, "");
            SENTENCE_TRAILER.replace(&unlabeled, "").trim().to_string()
        }
        _ => raw,
    }
}

fn level_prompt(words: &[String]) -> String {
    format!(
        "Assess how difficult these English words are and determine the overall English \
         level (A1, A2, B1, B2, C1, C2): {}.\n\n\
         Reply with JSON only, in this format:\n\
         {{\n  \"level\": \"level, e.g. B1\",\n  \"description\": \"description of the level \
         and the difficulty of the words\",\n  \"examples\": [\n    {{\"word\": \"word\", \
         \"translation\": \"translation\", \"meaning\": \"meaning and context\"}}\n  ]\n}}\n\
         Give 10 examples of the most important words.",
        words.join(", ")
    )
}

fn parse_level_reply(reply: &str) -> LevelAnalysis {
    match serde_json::from_str::<LevelAnalysisRecord>(reply.trim()) {
        Ok(record) => record.to_domain(),
        Err(e) => {
            debug!("Level analysis reply is not JSON ({}), keeping it as text", e);
            LevelAnalysis {
                level: "Analysis complete".to_string(),
                description: reply.to_string(),
                examples: Vec::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_replies_lose_label_and_quotes() {
        let request = TranslationRequest::Sentence {
            sentence: "Hello.".into(),
        };
        assert_eq!(
            clean_reply(&request, "Translation: \"Привет.\" ".into()),
            "Привет."
        );
        assert_eq!(clean_reply(&request, "Привет.".into()), "Привет.");
    }

    #[test]
    fn word_replies_are_kept_verbatim() {
        let request = TranslationRequest::Word {
            word: "run".into(),
            sentence: "I run.".into(),
        };
        assert_eq!(clean_reply(&request, "Meaning: \"x\"".into()), "Meaning: \"x\"");
    }

    #[test]
    fn malformed_level_reply_becomes_description() {
        let analysis = parse_level_reply("Mostly B2 vocabulary.");
        assert_eq!(analysis.level, "Analysis complete");
        assert_eq!(analysis.description, "Mostly B2 vocabulary.");
        assert!(analysis.examples.is_empty());
    }

    #[test]
    fn structured_level_reply_is_parsed() {
        let analysis = parse_level_reply(
            r#" {"level": "C1", "description": "rare words",
                 "examples": [{"word": "arcane", "translation": "тайный", "meaning": "secret"}]} "#,
        );
        assert_eq!(analysis.level, "C1");
        assert_eq!(analysis.examples.len(), 1);
    }

    #[test]
    fn storing_sweeps_expired_word_entries() {
        let mut state = CoordinatorState::default();
        let word = |w: &str| TranslationKey::Word {
            word: w.into(),
            sentence: "s".into(),
        };
        state.store(word("old"), "a".into(), Duration::ZERO);
        state.store(TranslationKey::Sentence("kept".into()), "b".into(), Duration::ZERO);
        state.store(word("new"), "c".into(), Duration::ZERO);

        assert_eq!(state.cache.len(), 2);
        assert!(!state.cache.contains_key(&word("old")));
        assert!(state.cache.contains_key(&TranslationKey::Sentence("kept".into())));
    }

    #[test]
    fn keys_ignore_word_case_and_skip_general_requests() {
        let a = TranslationKey::for_request(&TranslationRequest::Word {
            word: "Run".into(),
            sentence: "s".into(),
        });
        let b = TranslationKey::for_request(&TranslationRequest::Word {
            word: "run".into(),
            sentence: "s".into(),
        });
        assert_eq!(a, b);
        assert!(TranslationKey::for_request(&TranslationRequest::General { text: "t".into() })
            .is_none());
    }
}
