use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded from the config file, then CLI flags override individual fields.
/// Missing file or missing fields fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load config from the default location, or defaults if there is none
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `<config dir>/pkgscout/config.toml`
    pub fn config_path() -> crate::Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("pkgscout")
            .join("config.toml"))
    }

    /// Where the key-value database lives
    pub fn store_path(&self) -> crate::Result<PathBuf> {
        match &self.storage.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("store.db")),
        }
    }

    /// Log file used while the TUI owns the terminal
    pub fn log_path() -> crate::Result<PathBuf> {
        Ok(Self::data_dir()?.join("pkgscout.log"))
    }

    fn data_dir() -> crate::Result<PathBuf> {
        Ok(dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("pkgscout"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry base URL (npm or a mirror)
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Request timeout; unset means the HTTP client's default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_registry_url() -> String {
    pkgscout_api::npm::NPM_REGISTRY_BASE.to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Database path; defaults to `<data dir>/pkgscout/store.db`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long toasts stay on screen
    #[serde(default = "default_toast_ttl")]
    pub toast_ttl_secs: u64,

    /// Enable mouse support in TUI
    #[serde(default)]
    pub mouse_enabled: bool,
}

fn default_toast_ttl() -> u64 {
    3
}

impl UiConfig {
    /// Toast lifetime as a chrono duration; values chrono can't hold are rejected
    pub fn toast_ttl(&self) -> crate::Result<chrono::TimeDelta> {
        i64::try_from(self.toast_ttl_secs)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .ok_or_else(|| {
                crate::Error::ConfigError(format!(
                    "ui.toast_ttl_secs = {} is out of range",
                    self.toast_ttl_secs
                ))
            })
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_ttl_secs: default_toast_ttl(),
            mouse_enabled: false,
        }
    }
}
