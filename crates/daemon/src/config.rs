use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use vitrine_runtime::{Settings, default_socket_path};

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub settings: Settings,
    // Unix domain socket path
    pub socket_path: PathBuf,
}

#[derive(Debug, Parser)]
#[command(name = "vitrine-daemon", about = "Vitrine listing daemon")]
pub struct Cli {
    /// Directory to serve (overrides VITRINE_SHARED_PATH)
    #[arg(long)]
    pub shared_path: Option<PathBuf>,

    /// Directory for generated thumbnails (overrides VITRINE_THUMBNAILS_PATH)
    #[arg(long)]
    pub thumbnails_path: Option<PathBuf>,

    /// Metadata database file (optional override)
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Path to Unix domain socket (optional override)
    #[arg(long)]
    pub socket_path: Option<PathBuf>,

    /// Concurrent reconciliations per listing
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Base URL for file and thumbnail links
    #[arg(long)]
    pub public_url: Option<String>,
}

impl DaemonConfig {
    pub fn from_args(args: &Cli) -> Result<Self> {
        let mut settings =
            Settings::from_env_with(args.shared_path.clone(), args.thumbnails_path.clone())?;

        if let Some(path) = &args.db_path {
            settings.db_path = path.clone();
        }
        if let Some(n) = args.max_workers.filter(|n| *n > 0) {
            settings.max_workers = n;
        }
        if let Some(url) = &args.public_url {
            settings.public_url = url.clone();
        }

        let socket_path = args.socket_path.clone().unwrap_or_else(default_socket_path);

        Ok(Self {
            settings,
            socket_path,
        })
    }

    pub fn from_env() -> Result<Self> {
        let args = Cli::parse();
        Self::from_args(&args)
    }
}
