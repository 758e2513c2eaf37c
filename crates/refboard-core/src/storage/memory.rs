//! In-memory storage implementation.

use super::{BlobStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with blobs.
    pub fn with_blobs<K, V>(blobs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let blobs = blobs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self {
            blobs: RwLock::new(blobs),
        }
    }
}

impl BlobStore for MemoryStorage {
    fn get_blob(&self, key: &str) -> StorageResult<Option<String>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        Ok(blobs.get(key).cloned())
    }

    fn set_blob(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let storage = MemoryStorage::new();
        storage.set_blob("test", "{}").unwrap();
        assert_eq!(storage.get_blob("test").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_missing_key() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_blob("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_prefilled_and_overwrite() {
        let storage = MemoryStorage::with_blobs([("a", "1"), ("b", "2")]);
        storage.set_blob("a", "3").unwrap();
        assert_eq!(storage.get_blob("a").unwrap().as_deref(), Some("3"));
        assert_eq!(storage.get_blob("b").unwrap().as_deref(), Some("2"));
    }
}
