/// Facts observed for one directory child by a single stat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFacts {
    /// Raw size; zero for directories
    pub size: u64,
    /// Last modified time, unix seconds
    pub mtime_secs: u64,
    /// True only for real directories, never for a link to one
    pub is_dir: bool,
}
