//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::MapDocument;
use crate::hex::GridDims;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Maps are kept as JSON text so loading goes through the same import path
/// as a file.
#[derive(Default)]
pub struct MemoryStorage {
    dims: GridDims,
    maps: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage for grids of the given size.
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            maps: RwLock::default(),
        }
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &MapDocument) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let json = document.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            let mut maps = self
                .maps
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            maps.insert(id, json);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<MapDocument>> {
        let id = id.to_string();
        Box::pin(async move {
            let maps = self
                .maps
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            let json = maps.get(&id).ok_or_else(|| StorageError::NotFound(id.clone()))?;
            MapDocument::from_json(json, self.dims)
                .map_err(|e| StorageError::Serialization(e.to_string()))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut maps = self
                .maps
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            maps.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let maps = self
                .maps
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(maps.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let maps = self
                .maps
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(maps.contains_key(&id))
        })
    }
}
