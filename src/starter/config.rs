use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use crate::packages::{Catalog, PackageCategory, load_catalog};
use crate::system::{DEFAULT_DESKTOP_FILE, DEFAULT_RESOURCE};

const DEFAULT_CONFIG_PATH: &str = "/etc/desktop-starter/config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StarterConfig {
    pub general: GeneralConfig,
    pub probe: ProbeConfig,
    pub autostart: AutostartConfig,
    pub storage: StorageConfig,
    /// Replaces the bundled catalog when non-empty
    pub categories: Vec<PackageCategory>,
}

impl StarterConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Default config file, falling back to defaults when it cannot be read or parsed
    pub fn load_or_default() -> Self {
        Self::load_or_default_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::load_from(path).unwrap_or_else(|e| {
            warn!("Ignoring config at {:?}: {}", path, e);
            Self::default()
        })
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: StarterConfig = toml::from_str(&content)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Catalog from the config, or the bundled one if the config lists none
    pub fn catalog(&self) -> Result<Catalog> {
        if self.categories.is_empty() {
            load_catalog()
        } else {
            Catalog::new(self.categories.clone())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub title: String,
    pub subtitle: String,
    /// Simulate status queries, storage and autostart without touching the system
    pub dryrun: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            title: "Desktop Starter".to_string(),
            subtitle: "Get your new desktop ready".to_string(),
            dryrun: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Command line run per package; `{package}` is replaced by the identifier
    pub command: String,
    pub timeout_secs: u64,
    /// Packages the dryrun probe reports as installed
    pub dryrun_installed: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            command: "pacman -Qq {package}".to_string(),
            timeout_secs: 10,
            dryrun_installed: vec!["firefox".to_string(), "git".to_string(), "vlc".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutostartConfig {
    /// Desktop entry copied into the autostart directory
    pub resource: PathBuf,
    pub file_name: String,
    /// Overrides `$XDG_CONFIG_HOME/autostart`
    pub directory: Option<PathBuf>,
}

impl Default for AutostartConfig {
    fn default() -> Self {
        Self {
            resource: PathBuf::from(DEFAULT_RESOURCE),
            file_name: DEFAULT_DESKTOP_FILE.to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides `$XDG_DATA_HOME/desktop-starter/preferences.toml`
    pub path: Option<PathBuf>,
}
