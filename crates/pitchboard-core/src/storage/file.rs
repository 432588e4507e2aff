//! Directory-backed storage.

use super::{
    BoxFuture, DocumentStore, FileStore, StorageError, StorageResult, StoredFile,
    sanitize_file_name, sanitize_id,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const FILES_DIR: &str = "files";

/// Stores documents as `<id>.json`, preview references as `<id>.preview`
/// and uploaded images under `files/`.
pub struct FileStorage {
    base_path: PathBuf,
}

fn read_optional(path: &Path) -> StorageResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::Io(format!("Failed to read {}: {}", path.display(), e))),
    }
}

fn write(path: &Path, contents: impl AsRef<[u8]>) -> StorageResult<()> {
    fs::write(path, contents)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
}

impl FileStorage {
    /// Open storage at a directory, creating it if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        let files = base_path.join(FILES_DIR);
        fs::create_dir_all(&files).map_err(|e| {
            StorageError::Io(format!("Failed to create storage directory: {}", e))
        })?;
        Ok(Self { base_path })
    }

    /// Storage in the user's local data directory.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("pitchboard").join("diagrams"))
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", sanitize_id(id)))
    }

    fn preview_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}.preview", sanitize_id(id)))
    }

    /// Location of an uploaded file.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.base_path.join(FILES_DIR).join(sanitize_file_name(file_name))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl DocumentStore for FileStorage {
    fn save_document(&self, id: &str, json: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.document_path(id);
        let json = json.to_string();
        Box::pin(async move { write(&path, json) })
    }

    fn load_document(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let path = self.document_path(id);
        Box::pin(async move { read_optional(&path) })
    }

    fn save_preview_reference(
        &self,
        id: &str,
        file_url: &str,
    ) -> BoxFuture<'_, StorageResult<()>> {
        let document = self.document_path(id);
        let path = self.preview_path(id);
        let id = id.to_string();
        let file_url = file_url.to_string();
        Box::pin(async move {
            if !document.exists() {
                return Err(StorageError::NotFound(id));
            }
            write(&path, file_url)
        })
    }

    fn load_preview_reference(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let path = self.preview_path(id);
        Box::pin(async move { read_optional(&path) })
    }

    fn list_documents(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;
            let mut ids = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "json") {
                    if let Some(name) = path.file_stem().and_then(|n| n.to_str()) {
                        ids.push(name.to_string());
                    }
                }
            }
            ids.sort();
            Ok(ids)
        })
    }

    fn delete_document(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let paths = [self.document_path(id), self.preview_path(id)];
        Box::pin(async move {
            for path in paths {
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => {
                        return Err(StorageError::Io(format!(
                            "Failed to delete {}: {}",
                            path.display(),
                            e
                        )));
                    }
                }
            }
            Ok(())
        })
    }
}

impl FileStore for FileStorage {
    fn save_image_file(
        &self,
        file_name: &str,
        base64_png: &str,
        owner_id: &str,
    ) -> BoxFuture<'_, StorageResult<StoredFile>> {
        let safe_name = sanitize_file_name(file_name);
        let path = self.file_path(file_name);
        let decoded = STANDARD.decode(base64_png);
        let owner = owner_id.to_string();
        Box::pin(async move {
            let bytes = decoded.map_err(|e| StorageError::InvalidImage(e.to_string()))?;
            write(&path, &bytes)?;
            log::info!("stored {} ({} bytes) for {owner}", path.display(), bytes.len());
            Ok(StoredFile {
                file_url: format!("/{FILES_DIR}/{safe_name}"),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.save_document("drill", r#"{"objects":[]}"#)).unwrap();
        let loaded = block_on(storage.load_document("drill")).unwrap();
        assert_eq!(loaded.as_deref(), Some(r#"{"objects":[]}"#));
        assert!(dir.path().join("drill.json").exists());
    }

    #[test]
    fn test_file_storage_missing_is_none() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(block_on(storage.load_document("nonexistent")).unwrap(), None);
        assert_eq!(block_on(storage.load_preview_reference("nonexistent")).unwrap(), None);
    }

    #[test]
    fn test_file_storage_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.save_document("drill/01:a", "{}")).unwrap();
        assert!(dir.path().join("drill_01_a.json").exists());
        assert!(block_on(storage.load_document("drill/01:a")).unwrap().is_some());
    }

    #[test]
    fn test_image_written_under_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let stored =
            block_on(storage.save_image_file("diagram-drill.png", "iVBORw==", "drill")).unwrap();
        assert_eq!(stored.file_url, "/files/diagram-drill.png");
        let bytes = fs::read(dir.path().join("files").join("diagram-drill.png")).unwrap();
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_preview_reference_round_trip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert!(matches!(
            block_on(storage.save_preview_reference("drill", "/files/a.png")),
            Err(StorageError::NotFound(_))
        ));
        block_on(storage.save_document("drill", "{}")).unwrap();
        block_on(storage.save_preview_reference("drill", "/files/a.png")).unwrap();
        assert_eq!(
            block_on(storage.load_preview_reference("drill")).unwrap().as_deref(),
            Some("/files/a.png")
        );
    }

    #[test]
    fn test_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.save_document("doc2", "{}")).unwrap();
        block_on(storage.save_document("doc1", "{}")).unwrap();
        assert_eq!(block_on(storage.list_documents()).unwrap(), vec!["doc1", "doc2"]);

        block_on(storage.delete_document("doc1")).unwrap();
        block_on(storage.delete_document("doc1")).unwrap();
        assert_eq!(block_on(storage.list_documents()).unwrap(), vec!["doc2"]);
    }
}
