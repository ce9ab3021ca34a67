use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::date::MonthLocale;
use crate::error::ConfigError;
use crate::models::Coordinates;
use crate::storage::CascadePolicy;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub storage: StorageConfig,
    pub cascade: CascadeConfig,
    pub locale: LocaleConfig,
    pub farm: FarmDefaults,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for the file backend. Relative paths are kept relative to
    /// the host's working directory.
    pub data_dir: PathBuf,
    /// Upper bound on the total bytes stored, like a browser storage quota.
    pub quota_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub policy: CascadePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub month_labels: MonthLocale,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FarmDefaults {
    pub default_lat: f64,
    pub default_lng: f64,
}

impl FarmDefaults {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.default_lat,
            lng: self.default_lng,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub producer_name: String,
}

/// Default configuration embedded in the library
const DEFAULT_CONFIG: &str = r#"
[storage]
data_dir = "farmlog-data"

[cascade]
policy = "traceability_only"

[locale]
month_labels = "es"

[farm]
# Bogotá
default_lat = 4.570868
default_lng = -74.297333

[session]
producer_name = "Juan Pérez"
"#;

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("farmlog-data"),
            quota_bytes: None,
        }
    }
}

impl Default for FarmDefaults {
    fn default() -> Self {
        Self {
            default_lat: 4.570868,
            default_lng: -74.297333,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            producer_name: "Juan Pérez".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }
}

/// Load configuration from `path`, falling back to the embedded default when
/// no path is given or the file does not exist.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig, ConfigError> {
    if let Some(path) = path {
        if path.exists() {
            tracing::info!("Loading config from: {}", path.display());
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            return DashboardConfig::from_toml_str(&contents);
        }
        tracing::warn!("config file not found at: {}", path.display());
    }

    tracing::info!("Using default embedded configuration");
    DashboardConfig::embedded()
}
