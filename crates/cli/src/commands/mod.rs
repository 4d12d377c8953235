pub mod check;
pub mod ls;
pub mod record;

use std::os::unix::net::UnixStream;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use vitrine_engine::DirectoryScanner;
use vitrine_protocol::codec::{read_message, write_message};
use vitrine_protocol::{DaemonRequest, DaemonResponse};
use vitrine_runtime::Settings;
use vitrine_store::RedbStore;

pub use check::CheckArgs;
pub use ls::LsArgs;
pub use record::RecordArgs;

/// Common error type for command handlers
pub type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

pub const EXIT_NOT_FOUND: u8 = 1;
pub const EXIT_FAILURE: u8 = 2;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List a directory below the shared root.
    ///
    /// Example:
    ///   vitrine ls videos
    ///   vitrine ls --json --daemon videos/2024
    Ls(LsArgs),

    /// Show the cached metadata row for a path.
    ///
    /// Example:
    ///   vitrine record videos/a.mp4
    Record(RecordArgs),

    /// Check external tools and print the effective settings.
    Check(CheckArgs),
}

/// Turn a command outcome into an exit code, reporting errors on stderr.
pub fn finish(kind: &str, result: CommandResult<ExitCode>) -> ExitCode {
    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("[{kind}] {e}");
            eprintln!("[{kind}] {e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Scanner over the on-disk store, for running without the daemon.
pub fn local_scanner() -> anyhow::Result<(Settings, DirectoryScanner)> {
    let settings = Settings::from_env()?;

    let store = RedbStore::open(&settings.db_path).with_context(|| {
        format!(
            "failed to open metadata store at {} (is the daemon running? try --daemon)",
            settings.db_path.display()
        )
    })?;

    let scanner = DirectoryScanner::from_settings(&settings, Arc::new(store));
    Ok((settings, scanner))
}

/// Send one request to the daemon and wait for its answer.
pub fn ask_daemon(socket_path: &Path, req: &DaemonRequest) -> anyhow::Result<DaemonResponse> {
    let mut stream = UnixStream::connect(socket_path).with_context(|| {
        format!(
            "failed to connect to vitrine daemon at {}",
            socket_path.display()
        )
    })?;

    write_message(&mut stream, req)?;
    read_message(&mut stream)
}
