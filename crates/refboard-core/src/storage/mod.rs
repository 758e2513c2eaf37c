//! Storage abstraction for persistence.

mod autosave;
mod memory;
mod migrate;
mod persistence;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use autosave::AutoSaveManager;
pub use memory::MemoryStorage;
pub use migrate::{Migration, migrate_document, migrate_legacy};
pub use persistence::{LoadSource, LoadedScene, Persistence};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Key of the current document.
pub const PRIMARY_KEY: &str = "referenceBoards";
/// Key of the previous good document.
pub const BACKUP_KEY: &str = "referenceBoards_backup";
/// Keys of the first panel layout, which stored images and texts separately.
pub const LEGACY_IMAGES_KEY: &str = "refImages";
pub const LEGACY_TEXTS_KEY: &str = "refTexts";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Corrupt document: {0}")]
    Corrupt(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A string blob store keyed by name.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait BlobStore: Send + Sync {
    /// Read a blob; `Ok(None)` when the key is absent.
    fn get_blob(&self, key: &str) -> StorageResult<Option<String>>;

    fn set_blob(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// A string blob store keyed by name (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait BlobStore {
    /// Read a blob; `Ok(None)` when the key is absent.
    fn get_blob(&self, key: &str) -> StorageResult<Option<String>>;

    fn set_blob(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<S: BlobStore + ?Sized> BlobStore for Arc<S> {
    fn get_blob(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_blob(key)
    }

    fn set_blob(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_blob(key, value)
    }
}
