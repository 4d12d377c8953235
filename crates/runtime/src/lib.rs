mod config;
pub mod logging;
mod settings;

pub use config::{
    DEFAULT_MAX_WORKERS, DEFAULT_PUBLIC_URL, MAX_WORKERS_ENV, SHARED_PATH_ENV,
    THUMBNAILS_PATH_ENV, default_db_path, default_socket_path, vitrine_dir,
};
pub use settings::{ConfigError, Settings, parse_max_workers};

pub use logging::init;
