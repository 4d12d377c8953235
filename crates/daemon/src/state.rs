use std::{fs, sync::Arc};

use anyhow::Context;
use vitrine_engine::{DirectoryScanner, UrlDecorator};
use vitrine_store::{MetadataStore, RedbStore};

use crate::config::DaemonConfig;

pub struct DaemonState {
    pub config: DaemonConfig,
    scanner: DirectoryScanner,
    decorator: UrlDecorator,
}

impl DaemonState {
    pub fn new(config: DaemonConfig) -> anyhow::Result<Self> {
        let settings = &config.settings;

        fs::create_dir_all(&settings.thumbnail_root).with_context(|| {
            format!(
                "Failed to create thumbnail directory {}",
                settings.thumbnail_root.display()
            )
        })?;

        let store = RedbStore::open(&settings.db_path).with_context(|| {
            format!(
                "Failed to open metadata store at {}",
                settings.db_path.display()
            )
        })?;

        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: DaemonConfig, store: Arc<dyn MetadataStore>) -> Self {
        let scanner = DirectoryScanner::from_settings(&config.settings, store);
        let decorator = UrlDecorator::new(config.settings.public_url.as_str());

        Self {
            config,
            scanner,
            decorator,
        }
    }

    pub fn scanner(&self) -> &DirectoryScanner {
        &self.scanner
    }

    pub fn decorator(&self) -> &UrlDecorator {
        &self.decorator
    }
}
