use std::process::ExitCode;

use clap::Args;
use vitrine_fs::{FfmpegThumbnailer, tool_available};
use vitrine_runtime::{Settings, default_socket_path};

use crate::commands::{EXIT_FAILURE, EXIT_NOT_FOUND};

#[derive(Debug, Args)]
pub struct CheckArgs {}

pub fn run(_args: CheckArgs) -> ExitCode {
    let tools = FfmpegThumbnailer::new();
    let mut missing = 0;

    for tool in [tools.ffmpeg(), tools.ffprobe()] {
        let found = tool_available(tool);
        if !found {
            missing += 1;
        }
        eprintln!(
            "[check] {:<8} {}",
            tool.display(),
            if found { "found" } else { "missing" }
        );
    }

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[check] settings:  {e}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    eprintln!("[check] shared:     {}", settings.shared_root.display());
    eprintln!("[check] thumbnails: {}", settings.thumbnail_root.display());
    eprintln!("[check] db:         {}", settings.db_path.display());
    eprintln!("[check] socket:     {}", default_socket_path().display());
    eprintln!("[check] workers:    {}", settings.max_workers);
    eprintln!("[check] url:        {}", settings.public_url);

    if !settings.shared_root.is_dir() {
        eprintln!("[check] shared root is not a directory");
        return ExitCode::from(EXIT_NOT_FOUND);
    }

    if missing > 0 {
        // Listings still work, only without video thumbnails.
        eprintln!("[check] video thumbnails disabled");
    }

    ExitCode::SUCCESS
}
