//! crates/vocab_reader_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! analysis engine independent of the storage backend and the translation provider.

use async_trait::async_trait;

use crate::domain::TranslationRequest;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage is full: {0}")]
    StorageFull(String),
    #[error("Translation API key is not configured")]
    MissingCredential,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistent key-value storage. Values are opaque strings (JSON in practice).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    /// Writes `value` under `key`. Fails with [`PortError::StorageFull`] when the
    /// backend's capacity would be exceeded; the previous value is then kept.
    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    async fn remove(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Sends one request to the translation provider and returns its raw reply text.
    async fn translate(&self, api_key: &str, request: &TranslationRequest) -> PortResult<String>;
}
