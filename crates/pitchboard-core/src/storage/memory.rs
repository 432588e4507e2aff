//! In-memory storage implementation.

use super::{BoxFuture, DocumentStore, FileStore, StorageError, StorageResult, StoredFile};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, String>>,
    previews: RwLock<HashMap<String, String>>,
    /// Uploaded files by name, decoded.
    files: RwLock<HashMap<String, Vec<u8>>>,
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded bytes of an uploaded file.
    pub fn file(&self, file_name: &str) -> Option<Vec<u8>> {
        self.files.read().ok()?.get(file_name).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.files.read().map(|f| f.len()).unwrap_or(0)
    }
}

impl DocumentStore for MemoryStorage {
    fn save_document(&self, id: &str, json: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let json = json.to_string();
        Box::pin(async move {
            self.documents.write().map_err(lock_error)?.insert(id, json);
            Ok(())
        })
    }

    fn load_document(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.documents.read().map_err(lock_error)?.get(&id).cloned()) })
    }

    fn save_preview_reference(
        &self,
        id: &str,
        file_url: &str,
    ) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let file_url = file_url.to_string();
        Box::pin(async move {
            if !self.documents.read().map_err(lock_error)?.contains_key(&id) {
                return Err(StorageError::NotFound(id));
            }
            self.previews.write().map_err(lock_error)?.insert(id, file_url);
            Ok(())
        })
    }

    fn load_preview_reference(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.previews.read().map_err(lock_error)?.get(&id).cloned()) })
    }

    fn list_documents(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let documents = self.documents.read().map_err(lock_error)?;
            Ok(documents.keys().cloned().collect())
        })
    }

    fn delete_document(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.documents.write().map_err(lock_error)?.remove(&id);
            self.previews.write().map_err(lock_error)?.remove(&id);
            Ok(())
        })
    }
}

impl FileStore for MemoryStorage {
    fn save_image_file(
        &self,
        file_name: &str,
        base64_png: &str,
        owner_id: &str,
    ) -> BoxFuture<'_, StorageResult<StoredFile>> {
        let file_name = file_name.to_string();
        let decoded = STANDARD.decode(base64_png);
        log::debug!("storing {file_name} for {owner_id}");
        Box::pin(async move {
            let bytes = decoded.map_err(|e| StorageError::InvalidImage(e.to_string()))?;
            self.files.write().map_err(lock_error)?.insert(file_name.clone(), bytes);
            Ok(StoredFile {
                file_url: format!("/files/{file_name}"),
            })
        })
    }
}
