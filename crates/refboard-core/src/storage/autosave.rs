//! Auto-save functionality for document persistence.
//!
//! Saves the document whenever the editor revision moves past the last
//! saved one. Failures are logged and never interrupt interaction.

use super::{BlobStore, Persistence, StorageResult};
use crate::scene::Scene;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Tracks which editor revision was last written to storage.
pub struct AutoSaveManager<S: BlobStore> {
    persistence: Persistence<S>,
    /// Minimum time between saves. Zero saves on every change.
    interval: Duration,
    last_save: Option<Instant>,
    saved_revision: Option<u64>,
}

impl<S: BlobStore> AutoSaveManager<S> {
    pub fn new(persistence: Persistence<S>) -> Self {
        Self {
            persistence,
            interval: Duration::ZERO,
            last_save: None,
            saved_revision: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Treat `revision` as already stored, e.g. right after loading.
    pub fn mark_saved(&mut self, revision: u64) {
        self.saved_revision = Some(revision);
    }

    pub fn is_dirty(&self, revision: u64) -> bool {
        self.saved_revision != Some(revision)
    }

    /// Check if the revision is unsaved and the interval has elapsed.
    pub fn should_save(&self, revision: u64) -> bool {
        if !self.is_dirty(revision) {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save if needed. Returns true if a save was performed.
    pub fn maybe_save(&mut self, revision: u64, scene: &Scene) -> bool {
        if !self.should_save(revision) {
            return false;
        }
        match self.save(revision, scene) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Auto-save failed: {}", e);
                false
            }
        }
    }

    /// Force save immediately.
    pub fn save(&mut self, revision: u64, scene: &Scene) -> StorageResult<()> {
        self.persistence.save(scene)?;
        self.last_save = Some(Instant::now());
        self.saved_revision = Some(revision);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, PRIMARY_KEY};

    #[test]
    fn test_saves_once_per_revision() {
        let mut autosave = AutoSaveManager::new(Persistence::new(MemoryStorage::new()));
        let scene = Scene::new();

        assert!(autosave.maybe_save(1, &scene));
        assert!(!autosave.maybe_save(1, &scene));
        assert!(autosave.maybe_save(2, &scene));
        assert!(autosave.persistence().store().get_blob(PRIMARY_KEY).unwrap().is_some());
    }

    #[test]
    fn test_mark_saved_skips_write() {
        let mut autosave = AutoSaveManager::new(Persistence::new(MemoryStorage::new()));
        autosave.mark_saved(0);
        assert!(!autosave.is_dirty(0));
        assert!(!autosave.maybe_save(0, &Scene::new()));
        assert_eq!(autosave.persistence().store().get_blob(PRIMARY_KEY).unwrap(), None);
    }

    #[test]
    fn test_interval_throttles() {
        let mut autosave = AutoSaveManager::new(Persistence::new(MemoryStorage::new()));
        autosave.set_interval(Duration::from_secs(3600));
        let scene = Scene::new();
        assert!(autosave.maybe_save(1, &scene));
        assert!(!autosave.maybe_save(2, &scene));
        assert!(autosave.is_dirty(2));
    }
}
