pub mod codec;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRequest {
    /// Directory relative to the served root; empty for the root itself
    pub path: String,
}

/// One directory child as returned to clients.
///
/// Every field is always present on the wire: optional values serialize as
/// `null` in JSON, which keeps the type usable with non-self-describing
/// encodings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedFile {
    pub id: u32,
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
    pub mime_type: Option<String>,
    pub path: String,
    pub thumbnail: Option<String>,
    pub updated_at: u64,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub path: String,
    pub entries: Vec<ListedFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Path relative to the served root
    pub path: String,
}

/// Cached metadata row as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: u32,
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
    pub mime_type: Option<String>,
    pub path: String,
    pub relative_path: String,
    pub thumbnail_path: Option<String>,
    pub thumbnail_relative_path: Option<String>,
    pub updated_at: u64,
    pub last_accessed: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum DaemonRequest {
    List(ListRequest),
    Record(RecordRequest),
    Ping,
    Status,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum DaemonResponse {
    Listing(ListResponse),
    Record(Option<StoredRecord>),
    NotFound(String),
    Pong,
    Status(String),
    Error(String),
}
