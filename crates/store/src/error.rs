use thiserror::Error;
use vitrine_fs::FileId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no record for id {0:#010x}")]
    NotFound(FileId),

    #[error("record {0:#010x} already exists")]
    Duplicate(FileId),

    #[error("database error: {0}")]
    Database(#[from] redb::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("failed to decode record: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("unsupported record version {0}")]
    Version(u8),
}

impl StoreError {
    /// Absence, as opposed to a storage fault.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Lift any of redb's per-operation error types.
pub(crate) fn fault<E: Into<redb::Error>>(e: E) -> StoreError {
    StoreError::Database(e.into())
}
