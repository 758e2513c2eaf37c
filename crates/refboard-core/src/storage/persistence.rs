//! Loading and saving the board document through a [`BlobStore`].

use super::migrate::{Migration, migrate_document, migrate_legacy};
use super::{
    BACKUP_KEY, BlobStore, LEGACY_IMAGES_KEY, LEGACY_TEXTS_KEY, PRIMARY_KEY, StorageError,
    StorageResult,
};
use crate::scene::Scene;
use serde_json::Value;

/// Where a loaded document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Primary,
    Backup,
    Legacy,
    /// Nothing usable was stored; a fresh document was created.
    Default,
}

/// Result of [`Persistence::load`].
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub scene: Scene,
    pub source: LoadSource,
    /// Items dropped or rewritten while migrating.
    pub repairs: Vec<String>,
}

/// Reads and writes the board document with a backup copy.
#[derive(Debug, Clone)]
pub struct Persistence<S: BlobStore> {
    store: S,
    primary_key: String,
    backup_key: String,
}

impl<S: BlobStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_keys(store, PRIMARY_KEY, BACKUP_KEY)
    }

    pub fn with_keys(store: S, primary_key: impl Into<String>, backup_key: impl Into<String>) -> Self {
        Self {
            store,
            primary_key: primary_key.into(),
            backup_key: backup_key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parse and migrate the blob under `key`. `Ok(None)` when absent.
    fn read(&self, key: &str) -> StorageResult<Option<Migration>> {
        let Some(json) = self.store.get_blob(key)? else {
            return Ok(None);
        };
        let value: Value = serde_json::from_str(&json)
            .map_err(|e| StorageError::Corrupt(format!("{key}: {e}")))?;
        migrate_document(&value).map(Some)
    }

    fn read_legacy(&self) -> StorageResult<Option<Migration>> {
        let images = self.store.get_blob(LEGACY_IMAGES_KEY)?;
        let texts = self.store.get_blob(LEGACY_TEXTS_KEY)?;
        if images.is_none() && texts.is_none() {
            return Ok(None);
        }
        migrate_legacy(images.as_deref(), texts.as_deref()).map(Some)
    }

    /// Load the document, falling back from the primary blob to the backup,
    /// then the legacy layout, then a fresh single-board document.
    ///
    /// Never fails: unreadable blobs are logged and skipped.
    pub fn load(&self) -> LoadedScene {
        for source in [LoadSource::Primary, LoadSource::Backup, LoadSource::Legacy] {
            let attempt = match source {
                LoadSource::Primary => self.read(&self.primary_key),
                LoadSource::Backup => self.read(&self.backup_key),
                _ => self.read_legacy(),
            };
            match attempt {
                Ok(Some(migration)) => {
                    log::info!(
                        "Loaded {} boards from {:?} storage",
                        migration.scene.boards().len(),
                        source
                    );
                    return LoadedScene {
                        scene: migration.scene,
                        source,
                        repairs: migration.repairs,
                    };
                }
                Ok(None) => {}
                Err(e) => log::warn!("Skipping {:?} document: {}", source, e),
            }
        }
        log::info!("No stored boards, starting with an empty document");
        LoadedScene {
            scene: Scene::new(),
            source: LoadSource::Default,
            repairs: Vec::new(),
        }
    }

    /// Save the document.
    ///
    /// When the document has content, the current primary blob is copied to
    /// the backup key first, provided it still parses.
    pub fn save(&self, scene: &Scene) -> StorageResult<()> {
        let json = scene.to_json()?;
        if scene.has_content() {
            match self.store.get_blob(&self.primary_key) {
                Ok(Some(previous)) if previous != json => {
                    if serde_json::from_str::<Value>(&previous).is_ok() {
                        self.store.set_blob(&self.backup_key, &previous)?;
                    } else {
                        log::warn!("Not rotating unparsable document into backup");
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("Could not read previous document for backup: {}", e),
            }
        }
        self.store.set_blob(&self.primary_key, &json)?;
        log::debug!("Saved {} bytes to {}", json.len(), self.primary_key);
        Ok(())
    }
}
