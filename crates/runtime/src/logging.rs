use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::config::{PROGRAM_LOG_DIR, PROGRAM_LOG_LEVEL};

enum LogTarget {
    Stderr,
    /// Stderr plus a daily log file.
    Tee(Mutex<File>),
}

pub struct Logger {
    level: Level,
    target: LogTarget,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let msg = format!(
                "{} {} [{}] {}",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            );

            eprintln!("{msg}");

            if let LogTarget::Tee(file) = &self.target {
                let mut file = file.lock().unwrap_or_else(|e| e.into_inner());
                // A failing log file must never take the process down.
                let _ = writeln!(file, "{msg}");
            }
        }
    }

    fn flush(&self) {
        if let LogTarget::Tee(file) = &self.target {
            let mut file = file.lock().unwrap_or_else(|e| e.into_inner());
            let _ = file.flush();
        }
    }
}

fn get_level_from_env() -> Level {
    std::env::var(PROGRAM_LOG_LEVEL)
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .and_then(|filter| filter.to_level())
        .unwrap_or(Level::Warn)
}

fn get_log_dir_from_env() -> Option<PathBuf> {
    std::env::var_os(PROGRAM_LOG_DIR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// `<dir>/<YYYY-MM-DD>.log` for the current local date.
pub fn daily_log_path(dir: &Path) -> PathBuf {
    dir.join(format!("{}.log", Local::now().format("%Y-%m-%d")))
}

fn open_daily_log(dir: &Path) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(daily_log_path(dir))
}

pub fn init() -> Result<(), SetLoggerError> {
    _init(get_level_from_env(), get_log_dir_from_env().as_deref())
}

pub fn _init(level: Level, log_dir: Option<&Path>) -> Result<(), SetLoggerError> {
    static LOGGER: OnceLock<Logger> = OnceLock::new();

    // Check whether it is an initial call,
    // since log::set_max_level uses the pass-in `level` value,
    // so in theory, the initial level at get_or_init and max_level
    // can create a mismatch.
    let init_call = LOGGER.get().is_none();

    let logger = LOGGER.get_or_init(|| {
        let target = match log_dir.map(open_daily_log) {
            Some(Ok(file)) => LogTarget::Tee(Mutex::new(file)),
            Some(Err(e)) => {
                eprintln!("[logging] cannot open log file, using stderr only: {e}");
                LogTarget::Stderr
            }
            None => LogTarget::Stderr,
        };
        Logger { level, target }
    });

    if init_call {
        log::set_logger(logger)?;
        log::set_max_level(level.to_level_filter());
    }

    Ok(())
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
