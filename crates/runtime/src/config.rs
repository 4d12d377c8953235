use std::path::PathBuf;

pub const PROGRAM_NAME: &str = "vitrine";
pub const PROGRAM_LOG_LEVEL: &str = "VITRINE_LOG_LEVEL";
pub const PROGRAM_LOG_DIR: &str = "VITRINE_LOG_DIR";

pub const SHARED_PATH_ENV: &str = "VITRINE_SHARED_PATH";
pub const THUMBNAILS_PATH_ENV: &str = "VITRINE_THUMBNAILS_PATH";
pub const MAX_WORKERS_ENV: &str = "VITRINE_MAX_WORKERS";
pub const DB_PATH_ENV: &str = "VITRINE_DB_PATH";
pub const PUBLIC_URL_ENV: &str = "VITRINE_PUBLIC_URL";

pub const DB_FILE_NAME: &str = "files.redb";
pub const SOCKET_FILE_NAME: &str = "daemon.sock";

/// Concurrent reconciliations per listing when nothing valid is configured.
pub const DEFAULT_MAX_WORKERS: usize = 4;
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";

pub fn xdg_or_home(xdg_var: &str, home_suffix: &str) -> PathBuf {
    if let Some(dir) = std::env::var_os(xdg_var) {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(home_suffix)
    }
}

pub fn vitrine_dir() -> PathBuf {
    xdg_or_home("XDG_CACHE_HOME", ".cache").join(PROGRAM_NAME)
}

/// Default metadata database path
pub fn default_db_path() -> PathBuf {
    vitrine_dir().join(DB_FILE_NAME)
}

/// Default daemon socket path
pub fn default_socket_path() -> PathBuf {
    vitrine_dir().join(SOCKET_FILE_NAME)
}
