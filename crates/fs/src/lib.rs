mod config;
pub mod identity;
pub mod mime;
mod record;
pub mod thumbnail;
mod walker;

pub use config::{MAX_FRAME_OFFSET_SECS, THUMBNAIL_WIDTH};
pub use identity::{FileId, identifier};
pub use mime::{ContentSniffer, MimeError, MimeSniffer, is_video};
pub use record::EntryFacts;
pub use thumbnail::{
    FfmpegThumbnailer, ThumbnailError, Thumbnailer, thumbnail_relative_path, tool_available,
};
pub use walker::{DirSize, dir_size, entry_name, inspect_entry, list_dir, now_secs, to_unix_secs};
