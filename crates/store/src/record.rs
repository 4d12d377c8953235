use std::path::PathBuf;

use bincode::config;
use serde::{Deserialize, Serialize};
use vitrine_fs::FileId;

use crate::StoreError;

/// Leading byte of every encoded row.
pub const RECORD_VERSION: u8 = 1;

/// Metadata previously observed for one served path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Hash of `relative_path`
    pub id: FileId,
    /// Display name
    pub name: String,
    /// Size in bytes; aggregate size for directories
    pub size: u64,
    pub is_dir: bool,
    pub mime_type: Option<String>,
    /// Absolute location on disk
    pub path: PathBuf,
    /// Location relative to the served root, `/` separated
    pub relative_path: String,
    /// Absolute thumbnail location
    pub thumbnail_path: Option<PathBuf>,
    /// Thumbnail location relative to the thumbnail root
    pub thumbnail_relative_path: Option<String>,
    /// Filesystem mtime at observation, unix seconds
    pub modified_secs: u64,
    /// When the row was last written, unix seconds
    pub accessed_secs: u64,
}

pub fn encode_record(record: &FileRecord) -> Result<Vec<u8>, StoreError> {
    let mut bytes = vec![RECORD_VERSION];
    bytes.extend(bincode::serde::encode_to_vec(record, config::standard())?);
    Ok(bytes)
}

pub fn decode_record(bytes: &[u8]) -> Result<FileRecord, StoreError> {
    match bytes.split_first() {
        Some((&RECORD_VERSION, payload)) => {
            let (record, _read): (FileRecord, usize) =
                bincode::serde::decode_from_slice(payload, config::standard())?;
            Ok(record)
        }
        Some((&other, _)) => Err(StoreError::Version(other)),
        None => Err(StoreError::Version(0)),
    }
}
