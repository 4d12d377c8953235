use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use thiserror::Error;

use crate::config::SNIFF_LEN;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_UTF8: &str = "text/plain; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum MimeError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Content-based MIME detection.
pub trait MimeSniffer: Send + Sync {
    fn detect(&self, path: &Path) -> Result<String, MimeError>;
}

/// Sniffs the head of a file against known magic numbers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentSniffer;

impl MimeSniffer for ContentSniffer {
    fn detect(&self, path: &Path) -> Result<String, MimeError> {
        let head = read_head(path, SNIFF_LEN).map_err(|source| MimeError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Ok(classify(&head).to_owned())
    }
}

fn read_head(path: &Path, limit: usize) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Classify a file head. Unknown binary data is `application/octet-stream`,
/// unknown UTF-8 data is text.
pub fn classify(head: &[u8]) -> &'static str {
    if head.is_empty() {
        return TEXT_PLAIN;
    }

    if let Some(kind) = infer::get(head) {
        return kind.mime_type();
    }

    match std::str::from_utf8(head) {
        Ok(_) => TEXT_UTF8,
        // The head may cut a multi-byte sequence in half.
        Err(e) if e.error_len().is_none() => TEXT_UTF8,
        Err(_) => OCTET_STREAM,
    }
}

/// `video` for `video/mp4`.
#[inline]
pub fn top_level_type(mime: &str) -> &str {
    mime.split('/').next().unwrap_or(mime)
}

#[inline]
pub fn is_video(mime: &str) -> bool {
    top_level_type(mime) == "video"
}

#[cfg(test)]
#[path = "mime_tests.rs"]
mod tests;
