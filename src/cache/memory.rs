//! In-process entry map.

use std::collections::HashMap;
use std::sync::Arc;

use super::entry::CacheEntry;
use super::key::CacheKey;

/// Unbounded map from key to entry. Emptied only by [`reset`](Self::reset).
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<CacheKey, Arc<CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Stores `entry`, replacing whatever was under `key`.
    pub fn put(&mut self, key: CacheKey, entry: Arc<CacheEntry>) {
        self.entries.insert(key, entry);
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::http::{Headers, Method};

    fn entry(status: u16) -> Arc<CacheEntry> {
        Arc::new(CacheEntry {
            scope: None,
            url: "http://example.com/".into(),
            body: None,
            method: Method::Get,
            status,
            headers: Headers::new(),
            content: Bytes::new(),
            request_headers: None,
        })
    }

    #[test]
    fn put_get_overwrite() {
        let mut m = MemoryStore::new();
        let k = CacheKey::from("k");
        assert!(m.get(&k).is_none());
        m.put(k.clone(), entry(200));
        assert_eq!(m.get(&k).unwrap().status, 200);
        m.put(k.clone(), entry(500));
        assert_eq!(m.get(&k).unwrap().status, 500);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let mut m = MemoryStore::new();
        m.put("a".into(), entry(200));
        m.put("b".into(), entry(201));
        m.reset();
        assert!(m.is_empty());
        assert!(!m.contains(&"a".into()));
    }
}
