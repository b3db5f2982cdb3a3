//! Cache configuration.
//!
//! [`CacheConfig`] is injected into [`Cache::new`](crate::Cache::new). It can
//! be built programmatically or loaded from a YAML/JSON document; custom key
//! generators can only be registered in code.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::cache::key::{KeyGenerator, KeyGenerators};
use crate::error::{CacheError, CacheResult};

/// Query parameter stripped by default when dynamic JSONP rewriting is on.
pub const DEFAULT_DYNAMIC_JSONP_KEY: &str = "callback";

/// Directory name used under the system temp dir when no path is configured.
const DEFAULT_CACHE_DIR: &str = "replay-cache";

/// Settings consumed by the cache.
///
/// # Examples
///
/// ```
/// use replay_cache::CacheConfig;
///
/// let config = CacheConfig::from_yaml_str(
///     "persist_cache: true\ncache_path: /tmp/fixtures\nignore_params:\n  - http://example.com/analytics\n",
/// )
/// .unwrap();
///
/// assert!(config.persist_cache);
/// assert!(config.ignore_cache_port);
/// assert_eq!(config.dynamic_jsonp_keys, vec!["callback".to_string()]);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Mirror every stored entry to disk and consult disk on memory misses.
    pub persist_cache: bool,
    /// Directory holding one `<key>.yml` file per persisted entry.
    pub cache_path: PathBuf,
    /// Record request headers alongside the response.
    pub cache_request_headers: bool,
    /// URLs (without query or fragment) whose query string and body are
    /// ignored for keying.
    pub ignore_params: Vec<String>,
    /// Strip [`dynamic_jsonp_keys`](Self::dynamic_jsonp_keys) from query strings.
    pub dynamic_jsonp: bool,
    /// Query parameter names that vary per request and must not fragment the cache.
    pub dynamic_jsonp_keys: Vec<String>,
    /// Treat URLs that differ only in port as the same resource.
    pub ignore_cache_port: bool,
    /// Per-host key strategies, consulted before the default derivation.
    #[serde(skip)]
    pub key_generators: KeyGenerators,
}

impl CacheConfig {
    /// Creates a configuration with every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a YAML (or JSON) document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`] if the document is not valid YAML or a
    /// field has the wrong type.
    pub fn from_yaml_str(doc: &str) -> CacheResult<Self> {
        serde_yaml::from_str(doc).map_err(CacheError::Config)
    }

    /// Enables persistence under `path`.
    #[must_use]
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_cache = true;
        self.cache_path = path.into();
        self
    }

    /// Toggles recording of request headers.
    #[must_use]
    pub fn cache_request_headers(mut self, enabled: bool) -> Self {
        self.cache_request_headers = enabled;
        self
    }

    /// Adds a URL whose query string and body do not participate in keying.
    #[must_use]
    pub fn ignore_params_for(mut self, url: impl Into<String>) -> Self {
        self.ignore_params.push(url.into());
        self
    }

    /// Enables dynamic JSONP rewriting, stripping the given query parameters.
    #[must_use]
    pub fn dynamic_jsonp<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dynamic_jsonp = true;
        self.dynamic_jsonp_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Toggles whether the port participates in URL normalization.
    #[must_use]
    pub fn ignore_cache_port(mut self, ignore: bool) -> Self {
        self.ignore_cache_port = ignore;
        self
    }

    /// Registers a custom key strategy for `host`.
    #[must_use]
    pub fn key_generator(mut self, host: &str, generator: impl KeyGenerator + 'static) -> Self {
        self.key_generators.register(host, Arc::new(generator));
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            persist_cache: false,
            cache_path: std::env::temp_dir().join(DEFAULT_CACHE_DIR),
            cache_request_headers: false,
            ignore_params: Vec::new(),
            dynamic_jsonp: false,
            dynamic_jsonp_keys: vec![DEFAULT_DYNAMIC_JSONP_KEY.to_owned()],
            ignore_cache_port: true,
            key_generators: KeyGenerators::default(),
        }
    }
}
