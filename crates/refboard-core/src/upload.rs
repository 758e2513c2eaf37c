//! Image upload boundary.
//!
//! Pasted and dropped images are inserted with an inline `data:` URL right
//! away. The host then runs the upload through an [`AssetUploader`] and hands
//! the result back to the editor, which swaps in the durable URL.

use crate::board::BoardId;
use crate::items::{ImageFormat, ItemId};
use crate::storage::BoxFuture;
use base64::{Engine, engine::general_purpose::STANDARD};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Upload rejected: {0}")]
    Rejected(String),
    #[error("Upload timed out")]
    Timeout,
    #[error("Upload error: {0}")]
    Other(String),
}

pub type UploadResult<T> = Result<T, UploadError>;

/// Turns raw image bytes into a durable URL.
#[cfg(not(target_arch = "wasm32"))]
pub trait AssetUploader: Send + Sync {
    /// Upload image data for an item and resolve to its URL.
    fn upload(&self, data: Vec<u8>, item_id: ItemId) -> BoxFuture<'_, UploadResult<String>>;

    /// Delete the stored asset of a removed item.
    fn delete(&self, item_id: ItemId) -> BoxFuture<'_, UploadResult<()>>;
}

/// Turns raw image bytes into a durable URL (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait AssetUploader {
    /// Upload image data for an item and resolve to its URL.
    fn upload(&self, data: Vec<u8>, item_id: ItemId) -> BoxFuture<'_, UploadResult<String>>;

    /// Delete the stored asset of a removed item.
    fn delete(&self, item_id: ItemId) -> BoxFuture<'_, UploadResult<()>>;
}

/// An image inserted with inline data whose upload has not run yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub board_id: BoardId,
    pub item_id: ItemId,
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

impl PendingUpload {
    /// Start the upload. The data is handed to the uploader.
    pub fn start(self, uploader: &dyn AssetUploader) -> BoxFuture<'_, UploadResult<String>> {
        uploader.upload(self.data, self.item_id)
    }
}

/// Encode image bytes as a `data:` URL.
pub fn to_data_url(data: &[u8], format: ImageFormat) -> String {
    format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(data))
}

/// Uploader that keeps assets in memory and hands out `memory://` URLs.
#[derive(Debug, Default)]
pub struct MemoryUploader {
    assets: RwLock<HashMap<ItemId, Vec<u8>>>,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asset(&self, item_id: ItemId) -> Option<Vec<u8>> {
        self.assets.read().ok()?.get(&item_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.assets.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetUploader for MemoryUploader {
    fn upload(&self, data: Vec<u8>, item_id: ItemId) -> BoxFuture<'_, UploadResult<String>> {
        Box::pin(async move {
            if data.is_empty() {
                return Err(UploadError::Rejected("empty image".to_string()));
            }
            let mut assets = self
                .assets
                .write()
                .map_err(|e| UploadError::Other(format!("Lock error: {}", e)))?;
            assets.insert(item_id, data);
            Ok(format!("memory://images/{item_id}"))
        })
    }

    fn delete(&self, item_id: ItemId) -> BoxFuture<'_, UploadResult<()>> {
        Box::pin(async move {
            let mut assets = self
                .assets
                .write()
                .map_err(|e| UploadError::Other(format!("Lock error: {}", e)))?;
            assets.remove(&item_id);
            Ok(())
        })
    }
}
