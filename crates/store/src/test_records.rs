use std::path::PathBuf;

use crate::FileRecord;

pub(crate) fn sample_record(relative_path: &str) -> FileRecord {
    let name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    FileRecord {
        id: vitrine_fs::identifier(relative_path),
        name: name.to_owned(),
        size: 1024,
        is_dir: false,
        mime_type: Some("video/mp4".to_owned()),
        path: PathBuf::from("/srv/media").join(relative_path),
        relative_path: relative_path.to_owned(),
        thumbnail_path: Some(PathBuf::from("/var/cache/thumbs/clip.webp")),
        thumbnail_relative_path: Some("clip.webp".to_owned()),
        modified_secs: 1_700_000_000,
        accessed_secs: 1_700_000_100,
    }
}
