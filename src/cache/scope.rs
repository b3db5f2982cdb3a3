//! Cache scopes and scoped execution.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Cache;

/// An opaque tag partitioning the cache namespace.
///
/// Identical requests made under different scopes derive different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Restores the previous scope of a [`Cache`] when dropped.
///
/// Returned by [`Cache::scoped`]. Guards nest: dropping them in reverse
/// order of creation walks the scope back out one level at a time. The
/// restore also runs while unwinding from a panic.
#[must_use = "the previous scope is restored as soon as the guard is dropped"]
pub struct ScopeGuard<'a> {
    cache: &'a Cache,
    previous: Option<Scope>,
}

impl<'a> ScopeGuard<'a> {
    pub(super) fn new(cache: &'a Cache, previous: Option<Scope>) -> Self {
        Self { cache, previous }
    }

    /// The scope that will be restored.
    pub fn previous(&self) -> Option<&Scope> {
        self.previous.as_ref()
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.cache.replace_scope(self.previous.take());
    }
}

impl fmt::Debug for ScopeGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("previous", &self.previous)
            .finish_non_exhaustive()
    }
}
