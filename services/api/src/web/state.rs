//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::library::LibraryService;
use crate::translation::TranslationCoordinator;
use std::sync::Arc;
use vocab_reader_core::ports::{KeyValueStore, TranslationService};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<LibraryService>,
    pub translations: Arc<TranslationCoordinator>,
}

impl AppState {
    /// Wires the orchestration layer onto the given adapters.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        translator: Arc<dyn TranslationService>,
        storage_prefix: &str,
        rate_limit_retry_delay: std::time::Duration,
    ) -> Self {
        Self {
            library: Arc::new(LibraryService::new(store, storage_prefix)),
            translations: Arc::new(TranslationCoordinator::new(
                translator,
                rate_limit_retry_delay,
            )),
        }
    }
}
