//! File-based storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::MapDocument;
use crate::hex::GridDims;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each map as a `<id>.json` file in one directory.
pub struct FileStorage {
    base_path: PathBuf,
    dims: GridDims,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf, dims: GridDims) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path, dims })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/hexforge/maps/`
    /// On Windows: `%LOCALAPPDATA%\hexforge\maps\`
    pub fn default_location(dims: GridDims) -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("hexforge").join("maps"), dims)
    }

    fn map_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &MapDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.map_path(id);
        let json = document.to_json();

        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(&path, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            log::debug!("Saved map to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<MapDocument>> {
        let path = self.map_path(id);
        let id = id.to_string();
        let dims = self.dims;

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id));
            }
            let json = fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })?;
            MapDocument::from_json(&json, dims).map_err(|e| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.map_path(id);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let ids = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .collect();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.map_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexCoord;
    use crate::storage::block_on;
    use tempfile::tempdir;

    const DIMS: GridDims = GridDims::new(6, 6);

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf(), DIMS).unwrap();

        let mut doc = MapDocument::blank(DIMS);
        doc.grid_data.set_lore(HexCoord::new(2, 3), "An old watchtower.");
        doc.party_pos = Some(HexCoord::new(1, 1));

        block_on(storage.save("test-map", &doc)).unwrap();
        let loaded = block_on(storage.load("test-map")).unwrap();

        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf(), DIMS).unwrap();

        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf(), DIMS).unwrap();
        fs::write(dir.path().join("broken.json"), "{{{").unwrap();

        let result = block_on(storage.load("broken"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_file_storage_list_ignores_other_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf(), DIMS).unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let doc = MapDocument::blank(DIMS);
        block_on(storage.save("map1", &doc)).unwrap();
        block_on(storage.save("map2", &doc)).unwrap();

        let mut list = block_on(storage.list()).unwrap();
        list.sort();
        assert_eq!(list, vec!["map1".to_string(), "map2".to_string()]);
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf(), DIMS).unwrap();

        block_on(storage.save("test", &MapDocument::blank(DIMS))).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());

        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_file_storage_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf(), DIMS).unwrap();

        block_on(storage.save("west/marches:v2", &MapDocument::blank(DIMS))).unwrap();
        assert!(dir.path().join("west_marches_v2.json").exists());
        assert!(block_on(storage.load("west/marches:v2")).is_ok());
    }
}
