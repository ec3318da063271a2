use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    CONFIG_FILE_NAME, DATA_DIR_ENV, DEFAULT_DATA_DIR, DEFAULT_LOG_DIR, INVENTORY_FILE_NAME,
    LOG_DIR_ENV, ROOT_MARKERS, SHARED_EXTERNALLY_DIR,
};
use crate::datafiles::find_project_root;
use crate::error::{DataError, Result};
use crate::inventory::InventoryManager;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Data directory the inventory commands operate on
    pub data_dir: PathBuf,
    /// Manifest file name inside the data directory
    pub inventory_file: String,
    /// Subdirectory created in every cloned data directory
    pub shared_externally_dir: String,
    pub log_dir: PathBuf,
    /// Tokens dropped when cleaning person names (compared after uppercasing)
    pub non_names: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            inventory_file: INVENTORY_FILE_NAME.to_string(),
            shared_externally_dir: SHARED_EXTERNALLY_DIR.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            non_names: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Otherwise `femsntl.toml` is looked up at
    /// the project root and defaults are used when there is none. `.env` and the
    /// process environment override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.is_file() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn default_path() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        let root = find_project_root(&cwd, ROOT_MARKERS).unwrap_or(cwd);
        Some(root.join(CONFIG_FILE_NAME))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(dir) = std::env::var(LOG_DIR_ENV) {
            if !dir.is_empty() {
                self.log_dir = PathBuf::from(dir);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("inventory_file", &self.inventory_file),
            ("shared_externally_dir", &self.shared_externally_dir),
        ] {
            if value.is_empty() || value.contains('/') || value.contains('\\') {
                return Err(DataError::Config(format!(
                    "{} must be a plain file name, got '{}'",
                    field, value
                )));
            }
        }
        Ok(())
    }

    /// Uppercased `non_names`, ready for exact matching against cleaned tokens.
    pub fn excluded_tokens(&self) -> Vec<String> {
        self.non_names.iter().map(|s| s.to_uppercase()).collect()
    }

    pub fn inventory_manager(&self, data_dir: &Path) -> InventoryManager {
        InventoryManager::new(data_dir)
            .with_manifest_name(self.inventory_file.clone())
            .with_shared_dir_name(self.shared_externally_dir.clone())
            .with_excluded_dir(self.log_dir.clone())
    }
}
