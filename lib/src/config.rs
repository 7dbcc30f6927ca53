use crate::error::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Template used when neither the config file nor the command line sets one
pub const DEFAULT_RECORD_TEMPLATE: &str = "- [{label}]({url}) <sup><sub><sub>{date}</sub></sub></sup>";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Keep index files without records and directories without content
    #[serde(default)]
    pub keep_empty: bool,

    /// Format of one bookmark line; slots are label, url and date
    #[serde(default = "default_record_template")]
    pub record_template: String,

    /// Directory the converted tree is written into (current directory when unset)
    #[serde(default)]
    pub output_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keep_empty: false,
            record_template: default_record_template(),
            output_root: None,
        }
    }
}

fn default_record_template() -> String {
    DEFAULT_RECORD_TEMPLATE.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| crate::MarktreeError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from default location (~/.config/marktree/config.yml)
    /// Falls back to default config if file doesn't exist
    pub fn load() -> Self {
        let config_path = crate::utils::get_config_dir().join("config.yml");

        if config_path.exists() {
            match Self::load_from_path(&config_path) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to load config from {:?}: {}", config_path, e);
                    warn!("Using default configuration");
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Resolved output directory
    pub fn output_dir(&self) -> PathBuf {
        self.output_root
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
