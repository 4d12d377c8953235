use crate::ListingEntry;

/// Turns served-relative paths into browsable URLs.
#[derive(Debug, Clone)]
pub struct UrlDecorator {
    base: String,
}

impl UrlDecorator {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn file_url(&self, path: &str) -> String {
        format!("{}/files/{}", self.base, path)
    }

    pub fn thumbnail_url(&self, thumbnail: &str) -> String {
        format!("{}/thumbnails/{}", self.base, thumbnail)
    }

    /// Fill `url`, and `thumbnail_url` only when the entry has a thumbnail.
    pub fn decorate(&self, entry: &mut ListingEntry) {
        entry.url = Some(self.file_url(&entry.path));
        entry.thumbnail_url = entry.thumbnail.as_deref().map(|t| self.thumbnail_url(t));
    }

    pub fn decorate_all(&self, entries: &mut [ListingEntry]) {
        for entry in entries {
            self.decorate(entry);
        }
    }
}
