use std::cmp::Ordering;

use vitrine_fs::FileId;
use vitrine_protocol::{ListedFile, StoredRecord};
use vitrine_store::FileRecord;

/// One directory child in a listing. Built per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
    pub mime_type: Option<String>,
    /// Location relative to the served root, `/` separated
    pub path: String,
    /// Thumbnail location relative to the thumbnail root
    pub thumbnail: Option<String>,
    pub modified_secs: u64,
    /// Filled by [`crate::UrlDecorator`]
    pub url: Option<String>,
    /// Filled by [`crate::UrlDecorator`], only when `thumbnail` is set
    pub thumbnail_url: Option<String>,
}

impl ListingEntry {
    /// Entry carrying only what is known without a stat call.
    pub fn bare(id: FileId, name: String, path: String) -> Self {
        Self {
            id,
            name,
            size: 0,
            is_dir: false,
            mime_type: None,
            path,
            thumbnail: None,
            modified_secs: 0,
            url: None,
            thumbnail_url: None,
        }
    }
}

/// Directories first, then case-insensitive name. Exact name comparison
/// settles names that only differ in case.
pub fn compare_entries(a: &ListingEntry, b: &ListingEntry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| cmp_ignore_case(&a.name, &b.name))
        .then_with(|| a.name.cmp(&b.name))
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

pub fn sort_listing(entries: &mut [ListingEntry]) {
    entries.sort_by(compare_entries);
}

impl From<ListingEntry> for ListedFile {
    fn from(e: ListingEntry) -> Self {
        ListedFile {
            id: e.id,
            name: e.name,
            size: e.size,
            is_directory: e.is_dir,
            mime_type: e.mime_type,
            path: e.path,
            thumbnail: e.thumbnail,
            updated_at: e.modified_secs,
            url: e.url,
            thumbnail_url: e.thumbnail_url,
        }
    }
}

/// Client view of a stored row.
pub fn to_stored_record(r: FileRecord) -> StoredRecord {
    StoredRecord {
        id: r.id,
        name: r.name,
        size: r.size,
        is_directory: r.is_dir,
        mime_type: r.mime_type,
        path: r.path.display().to_string(),
        relative_path: r.relative_path,
        thumbnail_path: r.thumbnail_path.map(|p| p.display().to_string()),
        thumbnail_relative_path: r.thumbnail_relative_path,
        updated_at: r.modified_secs,
        last_accessed: r.accessed_secs,
    }
}

#[cfg(test)]
#[path = "listing_tests.rs"]
mod tests;
