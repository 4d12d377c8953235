use bitflags::bitflags;
use vitrine_store::FileRecord;

use crate::ListingEntry;

bitflags! {
    /// Reasons a stored record no longer describes what is on disk.
    /// An empty set means the record can be reused as is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Staleness: u8 {
        /// mtime moved
        const MODIFIED  = 0b0000_0001;
        /// File became a directory or the other way round
        const KIND      = 0b0000_0010;
        /// Size of a regular file changed
        const SIZE      = 0b0000_0100;
        /// Row belongs to another path with the same identifier
        const COLLISION = 0b0000_1000;
    }
}

/// Compare a stored record against freshly observed facts.
///
/// Directory sizes are aggregates that are only recomputed on a miss, so
/// size takes part in the test for regular files only. Content rewritten
/// with an unchanged mtime and size goes unnoticed.
pub fn staleness(stored: &FileRecord, observed: &ListingEntry) -> Staleness {
    let mut flags = Staleness::empty();

    if stored.relative_path != observed.path {
        flags |= Staleness::COLLISION;
    }
    if stored.modified_secs != observed.modified_secs {
        flags |= Staleness::MODIFIED;
    }
    if stored.is_dir != observed.is_dir {
        flags |= Staleness::KIND;
    }
    if !observed.is_dir && stored.size != observed.size {
        flags |= Staleness::SIZE;
    }

    flags
}
