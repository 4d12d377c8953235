use std::sync::RwLock;

use hashbrown::{HashMap, hash_map::Entry};
use vitrine_fs::FileId;

use crate::{FileRecord, MetadataStore, StoreError};

/// In-process [`MetadataStore`]; contents are lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<FileId, FileRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetadataStore for MemoryStore {
    fn get(&self, id: FileId) -> Result<FileRecord, StoreError> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        rows.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn insert(&self, record: &FileRecord) -> Result<(), StoreError> {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        match rows.entry(record.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(record.id)),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    fn update(&self, record: &FileRecord) -> Result<(), StoreError> {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        match rows.get_mut(&record.id) {
            Some(row) => {
                *row = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(record.id)),
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
