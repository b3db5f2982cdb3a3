//! The stored unit of the cache.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::scope::Scope;
use crate::http::{Headers, Method};

/// A recorded request/response pair.
///
/// Entries are never mutated once stored; storing again under the same key
/// replaces the whole entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Scope active when the entry was written.
    pub scope: Option<Scope>,
    /// Normalized request URL.
    pub url: String,
    /// Request body as sent, before canonicalization.
    pub body: Option<String>,
    pub method: Method,
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// Raw response body.
    #[serde(with = "content")]
    pub content: Bytes,
    /// Present only when request-header caching is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<Headers>,
}

/// UTF-8 bodies are written as plain strings, anything else as `{ base64: ... }`.
mod content {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use bytes::Bytes;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    #[serde(untagged)]
    enum Borrowed<'a> {
        Text(&'a str),
        Binary { base64: String },
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Owned {
        Text(String),
        Binary { base64: String },
    }

    pub fn serialize<S: Serializer>(content: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(content) {
            Ok(text) => Borrowed::Text(text).serialize(serializer),
            Err(_) => Borrowed::Binary {
                base64: STANDARD.encode(content),
            }
            .serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        match Owned::deserialize(deserializer)? {
            Owned::Text(text) => Ok(Bytes::from(text)),
            Owned::Binary { base64 } => STANDARD
                .decode(base64)
                .map(Bytes::from)
                .map_err(D::Error::custom),
        }
    }
}
