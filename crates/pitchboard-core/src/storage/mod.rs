//! Storage collaborators for diagram documents and preview images.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Invalid image data: {0}")]
    InvalidImage(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Reference to an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_url: String,
}

/// Keeps diagram JSON and the preview reference of each document.
pub trait DocumentStore: Send + Sync {
    /// Persist the diagram JSON for a document.
    fn save_document(&self, id: &str, json: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Stored diagram JSON, if any.
    fn load_document(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Record where the document's preview image lives.
    fn save_preview_reference(&self, id: &str, file_url: &str)
        -> BoxFuture<'_, StorageResult<()>>;

    fn load_preview_reference(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Ids of all stored documents.
    fn list_documents(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn delete_document(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// Accepts uploaded image files.
pub trait FileStore: Send + Sync {
    /// Store a base64-encoded PNG attached to `owner_id`.
    fn save_image_file(
        &self,
        file_name: &str,
        base64_png: &str,
        owner_id: &str,
    ) -> BoxFuture<'_, StorageResult<StoredFile>>;
}

/// Make an id safe to use as a file name.
pub(crate) fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Like [`sanitize_id`] but keeps an extension dot. A leading dot is replaced.
pub(crate) fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .enumerate()
        .map(|(i, c)| match c {
            '.' if i > 0 => c,
            c if c.is_alphanumeric() || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("drill/01:a*b"), "drill_01_a_b");
        assert_eq!(sanitize_file_name("diagram-x.png"), "diagram-x.png");
        assert_eq!(sanitize_file_name("../etc"), "_._etc");
    }
}
