mod error;
mod memory;
mod record;
mod redb_store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use record::{FileRecord, RECORD_VERSION, decode_record, encode_record};
pub use redb_store::RedbStore;

use vitrine_fs::FileId;

/// Persistent metadata keyed by path identifier.
///
/// Stores provide no locking beyond single-call atomicity; concurrent
/// writers to the same identifier are last-writer-wins.
pub trait MetadataStore: Send + Sync {
    /// Fetch a record. Absence is [`StoreError::NotFound`].
    fn get(&self, id: FileId) -> Result<FileRecord, StoreError>;

    /// Add a record for an identifier that has never been stored.
    fn insert(&self, record: &FileRecord) -> Result<(), StoreError>;

    /// Replace the whole row of an existing identifier.
    fn update(&self, record: &FileRecord) -> Result<(), StoreError>;
}

#[cfg(test)]
mod test_records;
