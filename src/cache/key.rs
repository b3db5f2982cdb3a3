//! Cache key derivation.
//!
//! The default key is
//! `method_host_SHA1(scope + normalized_url)[SHA1(canonical_body)]` with the
//! verb lower-cased, where the
//! body digest is present only for POST requests whose URL is not in the
//! ignore-params list. A [`KeyGenerator`] registered for the URL's host takes
//! precedence over the default.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use sha1::{Digest, Sha1};
use tracing::info;

use super::body::canonicalize_body;
use super::normalize::UrlNormalizer;
use super::scope::Scope;
use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::http::Method;

/// Opaque identifier of a cached entry. Also the durable file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A per-host key strategy.
///
/// Receives the method, the normalized URL, and the original request body.
/// Returning `None` falls back to the default derivation.
///
/// Any `Fn(&Method, &str, Option<&str>) -> Option<String>` closure implements
/// this trait. Generators run without the cache lock held, so they may call
/// back into the [`Cache`](crate::Cache).
pub trait KeyGenerator: Send + Sync {
    fn generate(&self, method: &Method, url: &str, body: Option<&str>) -> Option<String>;
}

impl<F> KeyGenerator for F
where
    F: Fn(&Method, &str, Option<&str>) -> Option<String> + Send + Sync,
{
    fn generate(&self, method: &Method, url: &str, body: Option<&str>) -> Option<String> {
        self(method, url, body)
    }
}

/// Registry of [`KeyGenerator`]s keyed by lower-cased host.
#[derive(Clone, Default)]
pub struct KeyGenerators {
    by_host: HashMap<String, Arc<dyn KeyGenerator>>,
}

impl KeyGenerators {
    /// Registers `generator` for `host`, replacing any previous one.
    pub fn register(&mut self, host: &str, generator: Arc<dyn KeyGenerator>) {
        self.by_host.insert(host.to_ascii_lowercase(), generator);
    }

    pub fn get(&self, host: &str) -> Option<&Arc<dyn KeyGenerator>> {
        self.by_host.get(host)
    }
}

impl fmt::Debug for KeyGenerators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hosts: Vec<_> = self.by_host.keys().collect();
        hosts.sort();
        f.debug_struct("KeyGenerators").field("hosts", &hosts).finish()
    }
}

/// Derives [`CacheKey`]s from request attributes and the active scope.
#[derive(Debug, Clone)]
pub struct KeyEngine {
    normalizer: UrlNormalizer,
    ignored: HashSet<String>,
    generators: KeyGenerators,
}

impl KeyEngine {
    /// Builds an engine from `config`.
    ///
    /// Ignore-params entries are normalized in strip mode so they compare
    /// equal to the stripped form of request URLs; entries that do not parse
    /// are kept as written.
    pub fn from_config(config: &CacheConfig) -> Self {
        let normalizer = UrlNormalizer::from_config(config);
        let ignored = config
            .ignore_params
            .iter()
            .map(|raw| match normalizer.normalize(raw, true) {
                Ok(url) => url.into_string(),
                Err(_) => raw.clone(),
            })
            .collect();
        Self {
            normalizer,
            ignored,
            generators: config.key_generators.clone(),
        }
    }

    pub fn normalizer(&self) -> &UrlNormalizer {
        &self.normalizer
    }

    /// Returns `true` if `url` is in the ignore-params list.
    pub fn ignores_params(&self, url: &str) -> CacheResult<bool> {
        let stripped = self.normalizer.normalize(url, true)?;
        Ok(self.ignored.contains(stripped.as_str()))
    }

    /// Derives the key for a request under `scope`.
    ///
    /// With `log_lookup`, emits one `info` record naming the URL, the
    /// key-relevant body (if any) and the key.
    pub fn derive(
        &self,
        method: &Method,
        url: &str,
        body: Option<&str>,
        scope: Option<&Scope>,
        log_lookup: bool,
    ) -> CacheResult<CacheKey> {
        let ignore_params = self.ignores_params(url)?;
        let normalized = self.normalizer.normalize(url, ignore_params)?;
        let canonical_body = canonicalize_body(body, method, ignore_params);

        let custom = self
            .generators
            .get(normalized.host())
            .and_then(|generator| generator.generate(method, normalized.as_str(), body));

        let key = match custom {
            Some(key) => CacheKey(key),
            None => {
                let scope = scope.map(Scope::as_str).unwrap_or_default();
                let mut key = format!(
                    "{}_{}_{}",
                    method.as_str().to_ascii_lowercase(),
                    normalized.host(),
                    sha1_hex(&[scope, normalized.as_str()])
                );
                if let Some(canonical) = &canonical_body {
                    key.push_str(&sha1_hex(&[canonical]));
                }
                CacheKey(key)
            }
        };

        if log_lookup {
            match &canonical_body {
                Some(canonical) => info!(url, body = %canonical, key = %key, "cache key"),
                None => info!(url, key = %key, "cache key"),
            }
        }

        Ok(key)
    }
}

fn sha1_hex(parts: &[&str]) -> String {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
