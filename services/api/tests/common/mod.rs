//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use api_lib::adapters::InMemoryStore;
use api_lib::library::LibraryService;
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use vocab_reader_core::domain::TranslationRequest;
use vocab_reader_core::ports::{KeyValueStore, PortError, PortResult, TranslationService};

pub const PREFIX: &str = "test_reader";

pub fn library() -> (Arc<InMemoryStore>, LibraryService) {
    let store = Arc::new(InMemoryStore::new());
    let library = LibraryService::new(store.clone(), PREFIX);
    (store, library)
}

//=========================================================================================
// Translator
//=========================================================================================

/// Replays queued replies in order; once the queue is empty every call succeeds
/// with `"translated"`. Optionally blocks each call until released.
#[derive(Default)]
pub struct ScriptedTranslator {
    replies: Mutex<VecDeque<PortResult<String>>>,
    requests: Mutex<Vec<TranslationRequest>>,
    gate: Option<Gate>,
}

pub struct Gate {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl ScriptedTranslator {
    pub fn new(replies: Vec<PortResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn gated(gate: Gate) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationService for ScriptedTranslator {
    async fn translate(&self, _api_key: &str, request: &TranslationRequest) -> PortResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok("translated".to_string()))
    }
}

//=========================================================================================
// Store
//=========================================================================================

/// Rejects dictionary writes as "storage full" while more than `max_books`
/// books are stored (always, when `max_books` is `None`).
pub struct CrowdedStore {
    inner: InMemoryStore,
    max_books: Option<usize>,
    pub dictionary_attempts: AtomicUsize,
}

impl CrowdedStore {
    pub fn new(max_books: Option<usize>) -> Self {
        Self {
            inner: InMemoryStore::new(),
            max_books,
            dictionary_attempts: AtomicUsize::new(0),
        }
    }

    async fn stored_books(&self) -> usize {
        let raw = self.inner.get(&format!("{PREFIX}_books")).await.unwrap();
        raw.map_or(0, |raw| {
            serde_json::from_str::<Vec<serde_json::Value>>(&raw)
                .unwrap()
                .len()
        })
    }
}

#[async_trait]
impl KeyValueStore for CrowdedStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        if key == format!("{PREFIX}_dictionary") {
            self.dictionary_attempts.fetch_add(1, Ordering::SeqCst);
            let fits = match self.max_books {
                Some(max) => self.stored_books().await <= max,
                None => false,
            };
            if !fits {
                return Err(PortError::StorageFull("simulated quota".to_string()));
            }
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.inner.remove(key).await
    }
}

/// Fails writes to the rejected collections (e.g. `"books"`) as "storage full".
#[derive(Default)]
pub struct RejectingStore {
    inner: InMemoryStore,
    rejected: Mutex<HashSet<String>>,
}

impl RejectingStore {
    pub fn reject(&self, collection: &str) {
        self.rejected
            .lock()
            .unwrap()
            .insert(format!("{PREFIX}_{collection}"));
    }
}

#[async_trait]
impl KeyValueStore for RejectingStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let rejected = self.rejected.lock().unwrap().contains(key);
        if rejected {
            return Err(PortError::StorageFull(format!("'{key}' is read-only")));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.inner.remove(key).await
    }
}
