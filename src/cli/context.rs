use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::AppConfig;

pub struct CliContext {
    config: Arc<AppConfig>,
    config_path: PathBuf,
    config_found: bool,
}

impl CliContext {
    pub fn new(config: AppConfig, config_path: PathBuf, config_found: bool) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            config_found,
        }
    }

    pub fn config(&self) -> &AppConfig {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config_found(&self) -> bool {
        self.config_found
    }
}
