//! Storage abstraction for persisted drawing documents.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::DrawingDocument;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Failures of a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Nothing is stored under the key.
    #[error("no drawing stored under {0:?}")]
    NotFound(String),
    /// The stored bytes are not a readable drawing document.
    #[error("unreadable drawing: {0}")]
    Serialization(String),
    #[error("storage I/O failed: {0}")]
    Io(String),
    #[error("storage unavailable: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future returned by every storage operation.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Thread-safety bound for storage backends: `Send + Sync` on native
/// targets, nothing on single-threaded wasm.
#[cfg(not(target_arch = "wasm32"))]
pub trait StorageBounds: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> StorageBounds for T {}

#[cfg(target_arch = "wasm32")]
pub trait StorageBounds {}
#[cfg(target_arch = "wasm32")]
impl<T> StorageBounds for T {}

/// A keyed store of drawing documents.
///
/// Keys are arbitrary strings chosen by the host. Operations return boxed
/// futures so backends can be used as trait objects on every target.
pub trait Storage: StorageBounds {
    fn save(&self, key: &str, document: &DrawingDocument) -> BoxFuture<'_, StorageResult<()>>;

    /// Load the document stored under `key`, or `StorageError::NotFound`.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<DrawingDocument>>;

    /// Remove `key`. Removing a missing key succeeds.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// All stored keys, sorted.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
