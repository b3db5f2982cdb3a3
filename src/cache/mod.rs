//! Record/replay response cache.
//!
//! [`Cache`] is the service object an interception layer talks to. It derives
//! a [`CacheKey`] for each request, answers lookups from the memory store
//! first and the durable store second, and records real responses into both.
//!
//! ## Core types
//!
//! - [`Cache`] — the service; create one per process and share it by reference.
//! - [`CacheEntry`] — an immutable recorded request/response pair.
//! - [`CacheKey`] — opaque key derived from method, URL, scope, and POST body.
//! - [`Scope`] / [`ScopeGuard`] — namespace partitioning and its RAII restore.
//! - [`KeyGenerator`] — per-host override of the default key derivation.
//!
//! ## Concurrency
//!
//! `Cache` is `Send + Sync`. A single mutex guards the memory store and the
//! current scope. Each operation snapshots the scope once, derives the key
//! from that snapshot with the lock released (so a [`KeyGenerator`] may call
//! back into the cache), then does its lookup or store as one critical
//! section. Scopes are process-wide: two threads changing the scope
//! concurrently will observe each other's changes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::http::{Headers, Method, Response};

pub mod body;
pub mod disk;
pub mod entry;
pub mod key;
pub mod memory;
pub mod normalize;
pub mod scope;

pub use entry::CacheEntry;
pub use key::{CacheKey, KeyEngine, KeyGenerator, KeyGenerators};
pub use scope::{Scope, ScopeGuard};

use disk::DiskStore;
use memory::MemoryStore;

#[derive(Debug, Default)]
struct State {
    memory: MemoryStore,
    scope: Option<Scope>,
}

/// The request/response cache.
///
/// # Examples
///
/// ```
/// use replay_cache::{Cache, CacheConfig};
/// use replay_cache::http::{Headers, Method, Response};
///
/// let cache = Cache::new(CacheConfig::default());
/// let url = "http://example.com/api/users?page=2";
///
/// assert!(!cache.is_cached(&Method::Get, url, None).unwrap());
///
/// let response = Response::new(200)
///     .header("Content-Type", "application/json")
///     .body("[]");
/// cache.store(&Method::Get, url, &Headers::new(), None, response).unwrap();
///
/// let entry = cache.fetch(&Method::Get, url, None).unwrap().unwrap();
/// assert_eq!(entry.status, 200);
/// assert_eq!(&entry.content[..], b"[]");
/// ```
#[derive(Debug)]
pub struct Cache {
    config: CacheConfig,
    keys: KeyEngine,
    disk: DiskStore,
    state: Mutex<State>,
}

impl Cache {
    /// Creates an empty cache driven by `config`.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            keys: KeyEngine::from_config(&config),
            disk: DiskStore::from_config(&config),
            config,
            state: Mutex::new(State::default()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Derives the key for a request under the current scope, without logging.
    ///
    /// # Errors
    ///
    /// Fails if `url` cannot be parsed or has no host.
    pub fn key(&self, method: &Method, url: &str, body: Option<&str>) -> CacheResult<CacheKey> {
        self.derive(method, url, body, false).map(|(key, _)| key)
    }

    /// Returns `true` if an entry exists in memory or on disk for the request.
    ///
    /// This is the first probe for a request, so it logs the derived key.
    pub fn is_cached(&self, method: &Method, url: &str, body: Option<&str>) -> CacheResult<bool> {
        let (key, _) = self.derive(method, url, body, true)?;
        let state = self.lock();
        Ok(state.memory.contains(&key) || self.disk.exists(&key))
    }

    /// Returns the entry for the request, loading it from disk on a memory miss.
    ///
    /// A disk hit is copied into memory. A corrupt record is a miss.
    pub fn fetch(
        &self,
        method: &Method,
        url: &str,
        body: Option<&str>,
    ) -> CacheResult<Option<Arc<CacheEntry>>> {
        let (key, _) = self.derive(method, url, body, false)?;
        let mut state = self.lock();

        if let Some(entry) = state.memory.get(&key) {
            debug!(key = %key, "memory hit");
            return Ok(Some(entry));
        }

        Ok(self.disk.load(&key).map(|entry| {
            debug!(key = %key, "disk hit");
            let entry = Arc::new(entry);
            state.memory.put(key, Arc::clone(&entry));
            entry
        }))
    }

    /// Records a real response for the request, replacing any previous entry.
    ///
    /// The entry is written to memory and, when persistence is on, to disk.
    /// A disk failure is logged and does not affect the memory write.
    pub fn store(
        &self,
        method: &Method,
        url: &str,
        request_headers: &Headers,
        body: Option<&str>,
        response: Response,
    ) -> CacheResult<CacheKey> {
        let served_url = self.keys.normalizer().normalize(url, false)?;
        let (status, headers, content) = response.into_parts();

        let (key, scope) = self.derive(method, url, body, false)?;

        let entry = Arc::new(CacheEntry {
            scope,
            url: served_url.into_string(),
            body: body.map(str::to_owned),
            method: method.clone(),
            status,
            headers,
            content,
            request_headers: self
                .config
                .cache_request_headers
                .then(|| request_headers.clone()),
        });

        let mut state = self.lock();
        state.memory.put(key.clone(), Arc::clone(&entry));
        self.disk.save(&key, &entry);
        debug!(key = %key, status, "stored");

        Ok(key)
    }

    /// Clears the memory store. Records on disk are left alone.
    pub fn reset(&self) {
        self.lock().memory.reset();
        debug!("memory cache reset");
    }

    /// Number of entries currently held in memory.
    pub fn len(&self) -> usize {
        self.lock().memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().memory.is_empty()
    }

    /// The active scope, if any.
    pub fn scope(&self) -> Option<Scope> {
        self.lock().scope.clone()
    }

    /// Sets the active scope. `None` returns to the default (unscoped) namespace.
    pub fn scope_to(&self, scope: Option<Scope>) {
        self.replace_scope(scope);
    }

    /// Returns to the default (unscoped) namespace.
    pub fn use_default_scope(&self) {
        self.replace_scope(None);
    }

    /// Switches to `scope` until the returned guard is dropped.
    pub fn scoped(&self, scope: Option<Scope>) -> ScopeGuard<'_> {
        let previous = self.replace_scope(scope);
        ScopeGuard::new(self, previous)
    }

    /// Runs `f` under `scope`, then restores the previous scope.
    ///
    /// The restore happens even if `f` panics. `f` may use the cache.
    ///
    /// # Examples
    ///
    /// ```
    /// use replay_cache::{Cache, CacheConfig, Scope};
    ///
    /// let cache = Cache::new(CacheConfig::default());
    /// cache.with_scope(Some(Scope::from("A")), || {
    ///     cache.with_scope(Some(Scope::from("B")), || {
    ///         assert_eq!(cache.scope(), Some(Scope::from("B")));
    ///     });
    ///     assert_eq!(cache.scope(), Some(Scope::from("A")));
    /// });
    /// assert_eq!(cache.scope(), None);
    /// ```
    pub fn with_scope<F, R>(&self, scope: Option<Scope>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = self.scoped(scope);
        f()
    }

    // The key and the scope snapshot it was derived under.
    fn derive(
        &self,
        method: &Method,
        url: &str,
        body: Option<&str>,
        log_lookup: bool,
    ) -> CacheResult<(CacheKey, Option<Scope>)> {
        let scope = self.scope();
        let key = self
            .keys
            .derive(method, url, body, scope.as_ref(), log_lookup)?;
        Ok((key, scope))
    }

    pub(crate) fn replace_scope(&self, scope: Option<Scope>) -> Option<Scope> {
        let mut state = self.lock();
        debug!(scope = ?scope, "scope changed");
        std::mem::replace(&mut state.scope, scope)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
