use thiserror::Error;

/// Error type for the persistence layer.
///
/// Only backend faults end up here. Missing data is never an error: an absent
/// farm is `None` and an unknown id resolves to an empty result.
#[derive(Error, Debug, Clone, PartialEq, uniffi::Error)]
pub enum StorageError {
    #[error("storage backend failed for key {key}: {message}")]
    Backend { key: String, message: String },

    #[error("failed to serialize value for key {key}: {message}")]
    Serialization { key: String, message: String },

    #[error("storage quota of {limit} bytes exceeded while writing key {key}")]
    QuotaExceeded { key: String, limit: u64 },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl StorageError {
    pub(crate) fn backend(key: &str, err: impl std::fmt::Display) -> Self {
        StorageError::Backend {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl From<ConfigError> for StorageError {
    fn from(err: ConfigError) -> Self {
        StorageError::Config {
            message: err.to_string(),
        }
    }
}

/// Error type for stored date strings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateError {
    #[error("malformed date: '{0}'")]
    Malformed(String),

    #[error("date out of range: {year:04}-{month:02}-{day:02}")]
    OutOfRange { year: i32, month: u32, day: u32 },
}
