/// Bytes read from the head of a file for content sniffing.
pub const SNIFF_LEN: usize = 3072;

/// Thumbnail width in pixels; height follows the probed aspect ratio.
pub const THUMBNAIL_WIDTH: u32 = 320;
/// Frame offset cap in seconds.
pub const MAX_FRAME_OFFSET_SECS: u64 = 8;
/// Aspect ratio used when probing fails.
pub const DEFAULT_ASPECT_RATIO: (u32, u32) = (16, 9);

pub const THUMBNAIL_EXTENSION: &str = "webp";
