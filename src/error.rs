//! Error types for key derivation, configuration, and the durable store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the cache.
///
/// Only [`InvalidUrl`](Self::InvalidUrl), [`MissingHost`](Self::MissingHost)
/// and [`Config`](Self::Config) ever reach callers of [`Cache`](crate::Cache).
/// Durable-store failures are logged and absorbed at the store boundary.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("URL '{url}' has no host")]
    MissingHost { url: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache record encoding error: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("invalid cache configuration: {0}")]
    Config(#[source] serde_yaml::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;
