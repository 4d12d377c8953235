//! Path identity.
//!
//! Identifiers are 32-bit FNV-1a hashes of the served-relative path and are
//! used as the persistent join key of the metadata store. They are stable
//! across restarts but not collision free; callers that need certainty must
//! compare the stored relative path as well.

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

pub type FileId = u32;

#[inline]
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Identifier of a relative path.
#[inline]
pub fn identifier(relative_path: &str) -> FileId {
    fnv1a_32(relative_path.as_bytes())
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
