use std::{env, path::PathBuf};

use log::warn;
use thiserror::Error;

use crate::config::{
    DB_PATH_ENV, DEFAULT_MAX_WORKERS, DEFAULT_PUBLIC_URL, MAX_WORKERS_ENV, PUBLIC_URL_ENV,
    SHARED_PATH_ENV, THUMBNAILS_PATH_ENV, default_db_path,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
}

/// Process-wide settings shared by the daemon and the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory exposed to clients
    pub shared_root: PathBuf,
    /// Directory generated thumbnails are written under
    pub thumbnail_root: PathBuf,
    /// Upper bound on concurrent reconciliations in one listing
    pub max_workers: usize,
    /// Metadata database file
    pub db_path: PathBuf,
    /// Base URL used when decorating listings
    pub public_url: String,
}

impl Settings {
    pub fn new(shared_root: PathBuf, thumbnail_root: PathBuf) -> Self {
        Self {
            shared_root,
            thumbnail_root,
            max_workers: DEFAULT_MAX_WORKERS,
            db_path: default_db_path(),
            public_url: DEFAULT_PUBLIC_URL.to_owned(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(None, None)
    }

    /// Like [`Settings::from_env`], with the two roots taken from the
    /// arguments when given so the variables become optional.
    pub fn from_env_with(
        shared_root: Option<PathBuf>,
        thumbnail_root: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let shared_root = match shared_root {
            Some(p) => p,
            None => required_path(SHARED_PATH_ENV)?,
        };
        let thumbnail_root = match thumbnail_root {
            Some(p) => p,
            None => required_path(THUMBNAILS_PATH_ENV)?,
        };

        let max_workers = parse_max_workers(env::var(MAX_WORKERS_ENV).ok().as_deref());

        let db_path = env::var_os(DB_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let public_url = env::var(PUBLIC_URL_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_owned());

        Ok(Self {
            shared_root,
            thumbnail_root,
            max_workers,
            db_path,
            public_url,
        })
    }
}

fn required_path(var: &'static str) -> Result<PathBuf, ConfigError> {
    match env::var_os(var) {
        Some(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => Err(ConfigError::Missing(var)),
    }
}

/// Parse the worker bound. Anything that is not a positive integer falls
/// back to [`DEFAULT_MAX_WORKERS`].
pub fn parse_max_workers(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return DEFAULT_MAX_WORKERS;
    };

    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            warn!("ignoring invalid {MAX_WORKERS_ENV}={raw:?}, using {DEFAULT_MAX_WORKERS}");
            DEFAULT_MAX_WORKERS
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
