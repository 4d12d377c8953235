use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use log::debug;
use thiserror::Error;

use crate::config::{
    DEFAULT_ASPECT_RATIO, MAX_FRAME_OFFSET_SECS, THUMBNAIL_EXTENSION, THUMBNAIL_WIDTH,
};

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("failed to prepare thumbnail destination: {0}")]
    Io(#[from] io::Error),

    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} exited with {status}")]
    ToolFailed { tool: String, status: ExitStatus },

    #[error("unusable probe output: {0:?}")]
    Probe(String),
}

/// Produces a still image for a video.
///
/// Implementations must be idempotent: when `destination` already exists the
/// call succeeds without doing any work.
pub trait Thumbnailer: Send + Sync {
    fn generate(&self, source: &Path, destination: &Path) -> Result<(), ThumbnailError>;
}

/// Thumbnailer backed by the `ffprobe` and `ffmpeg` executables.
#[derive(Debug, Clone)]
pub struct FfmpegThumbnailer {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    width: u32,
}

impl Default for FfmpegThumbnailer {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            width: THUMBNAIL_WIDTH,
        }
    }
}

impl FfmpegThumbnailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit executables instead of looking them up on `PATH`.
    pub fn with_tools(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            ..Self::default()
        }
    }

    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe(&self) -> &Path {
        &self.ffprobe
    }

    fn probe(&self, source: &Path, entries: &str) -> Result<String, ThumbnailError> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-select_streams", "v:0", "-show_entries"])
            .arg(entries)
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(source)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ThumbnailError::Spawn {
                tool: self.ffprobe.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ThumbnailError::ToolFailed {
                tool: self.ffprobe.display().to_string(),
                status: output.status,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn probe_aspect_ratio(&self, source: &Path) -> Result<(u32, u32), ThumbnailError> {
        let out = self.probe(source, "stream=display_aspect_ratio")?;
        if let Some(ratio) = parse_aspect_ratio(&out) {
            return Ok(ratio);
        }

        // No usable display aspect ratio; fall back to the stream dimensions.
        let out = self.probe(source, "stream=width,height")?;
        parse_dimensions(&out).ok_or(ThumbnailError::Probe(out))
    }

    fn probe_duration(&self, source: &Path) -> Result<u64, ThumbnailError> {
        let out = self.probe(source, "format=duration")?;
        parse_duration(&out).ok_or(ThumbnailError::Probe(out))
    }
}

impl Thumbnailer for FfmpegThumbnailer {
    fn generate(&self, source: &Path, destination: &Path) -> Result<(), ThumbnailError> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        if destination.exists() {
            return Ok(());
        }

        let ratio = self.probe_aspect_ratio(source).unwrap_or_else(|e| {
            debug!("[thumbnail] aspect ratio probe failed for {:?}: {e}", source);
            DEFAULT_ASPECT_RATIO
        });

        let duration = self.probe_duration(source).unwrap_or_else(|e| {
            debug!("[thumbnail] duration probe failed for {:?}: {e}", source);
            0
        });

        let status = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-i"])
            .arg(source)
            .arg("-ss")
            .arg(seek_timestamp(frame_offset(duration)))
            .arg("-vf")
            .arg(format!(
                "scale={}:{}",
                self.width,
                scaled_height(self.width, ratio)
            ))
            .args(["-frames:v", "1"])
            .arg(destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| ThumbnailError::Spawn {
                tool: self.ffmpeg.display().to_string(),
                source,
            })?;

        if !status.success() {
            // A partial image would satisfy the existence check on every later call.
            match fs::remove_file(destination) {
                Ok(()) => debug!("[thumbnail] removed partial {:?}", destination),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => debug!("[thumbnail] could not remove {:?}: {e}", destination),
            }

            return Err(ThumbnailError::ToolFailed {
                tool: self.ffmpeg.display().to_string(),
                status,
            });
        }

        Ok(())
    }
}

/// Whether `program -version` runs successfully.
pub fn tool_available(program: &Path) -> bool {
    Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Thumbnail location for a served-relative path: everything from the last
/// `.` of the final component is replaced by `.webp`, so a dotfile such as
/// `.mp4` maps to `.webp`. Names without a `.` get `.webp` appended.
pub fn thumbnail_relative_path(relative_path: &str) -> String {
    let unified = relative_path.replace('\\', "/");
    let name_start = unified.rfind('/').map_or(0, |i| i + 1);
    let stem_end = unified[name_start..]
        .rfind('.')
        .map_or(unified.len(), |i| name_start + i);

    format!("{}.{THUMBNAIL_EXTENSION}", &unified[..stem_end])
}

/// Parse `16:9` style output. Zero components are rejected since ffprobe
/// reports `0:1` for unknown ratios.
pub fn parse_aspect_ratio(out: &str) -> Option<(u32, u32)> {
    let (w, h) = out.trim().split_once(':')?;
    let w = w.trim().parse::<u32>().ok()?;
    let h = h.trim().parse::<u32>().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

/// Parse the `width\nheight\n` form.
pub fn parse_dimensions(out: &str) -> Option<(u32, u32)> {
    let mut lines = out.lines().map(str::trim).filter(|l| !l.is_empty());
    let w = lines.next()?.parse::<u32>().ok()?;
    let h = lines.next()?.parse::<u32>().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

/// Whole seconds of a `12.480000` style duration.
pub fn parse_duration(out: &str) -> Option<u64> {
    out.trim().split('.').next()?.parse::<u64>().ok()
}

#[inline]
pub fn frame_offset(duration_secs: u64) -> u64 {
    duration_secs.min(MAX_FRAME_OFFSET_SECS)
}

fn seek_timestamp(offset_secs: u64) -> String {
    format!("00:00:{:02}", offset_secs)
}

#[inline]
pub fn scaled_height(width: u32, (ratio_w, ratio_h): (u32, u32)) -> u32 {
    let h = u64::from(width) * u64::from(ratio_h) / u64::from(ratio_w.max(1));
    u32::try_from(h).unwrap_or(u32::MAX).max(1)
}

#[cfg(test)]
#[path = "thumbnail_tests.rs"]
mod tests;
