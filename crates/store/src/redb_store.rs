use std::path::Path;

use log::debug;
use redb::{Database, ReadableTable, TableDefinition};
use vitrine_fs::FileId;

use crate::{
    FileRecord, MetadataStore, StoreError,
    error::fault,
    record::{decode_record, encode_record},
};

const FILES_TABLE: TableDefinition<'static, u32, &'static [u8]> = TableDefinition::new("files");

/// [`MetadataStore`] persisted in a single redb file.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create the database at `path` and make sure the table exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            // Let redb report the real problem if this fails.
            if let Err(e) = std::fs::create_dir_all(parent) {
                debug!("[store] create_dir_all({:?}) failed: {e}", parent);
            }
        }

        let db = Database::create(path).map_err(fault)?;

        let txn = db.begin_write().map_err(fault)?;
        {
            txn.open_table(FILES_TABLE).map_err(fault)?;
        }
        txn.commit().map_err(fault)?;

        Ok(Self { db })
    }

    fn write(&self, record: &FileRecord, must_exist: bool) -> Result<(), StoreError> {
        let bytes = encode_record(record)?;

        let txn = self.db.begin_write().map_err(fault)?;
        let existed = {
            let mut table = txn.open_table(FILES_TABLE).map_err(fault)?;
            let existed = table.get(record.id).map_err(fault)?.is_some();
            if existed == must_exist {
                table.insert(record.id, bytes.as_slice()).map_err(fault)?;
            }
            existed
        };

        if existed != must_exist {
            txn.abort().map_err(fault)?;
            return Err(if must_exist {
                StoreError::NotFound(record.id)
            } else {
                StoreError::Duplicate(record.id)
            });
        }

        txn.commit().map_err(fault)?;
        Ok(())
    }
}

impl MetadataStore for RedbStore {
    fn get(&self, id: FileId) -> Result<FileRecord, StoreError> {
        let txn = self.db.begin_read().map_err(fault)?;
        let table = txn.open_table(FILES_TABLE).map_err(fault)?;

        match table.get(id).map_err(fault)? {
            Some(guard) => decode_record(guard.value()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn insert(&self, record: &FileRecord) -> Result<(), StoreError> {
        self.write(record, false)
    }

    fn update(&self, record: &FileRecord) -> Result<(), StoreError> {
        self.write(record, true)
    }
}

#[cfg(test)]
#[path = "redb_store_tests.rs"]
mod tests;
