use crate::mt::MtError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a document translation pass
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The translation provider rejected or failed the batch
    #[error("{provider} failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: MtError,
    },
}

impl TranslateError {
    /// Message suitable for showing to a user
    pub fn message(&self) -> String {
        match self {
            TranslateError::Provider { source, .. } => source.to_string(),
        }
    }
}

/// Failure loading or persisting the translation cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache file {path} is not valid: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure reading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path} is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
