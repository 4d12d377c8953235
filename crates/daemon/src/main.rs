use std::sync::Arc;

mod config;
mod listing;
mod rpc;
mod state;

use config::DaemonConfig;
use state::DaemonState;
use vitrine_fs::{FfmpegThumbnailer, tool_available};
use vitrine_runtime::logging;

use log::{info, warn};

fn main() -> anyhow::Result<()> {
    logging::init().ok();

    let config = DaemonConfig::from_env()?;
    let settings = &config.settings;

    info!(
        "Starting vitrine daemon: shared={}, thumbnails={}, db={}, socket={}, workers={}",
        settings.shared_root.display(),
        settings.thumbnail_root.display(),
        settings.db_path.display(),
        config.socket_path.display(),
        settings.max_workers,
    );

    let tools = FfmpegThumbnailer::new();
    for tool in [tools.ffmpeg(), tools.ffprobe()] {
        if !tool_available(tool) {
            warn!(
                "{} not found; video thumbnails will be skipped",
                tool.display()
            );
        }
    }

    let state = Arc::new(DaemonState::new(config)?);
    rpc::run_rpc_server(state)
}
