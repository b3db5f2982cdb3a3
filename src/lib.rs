//! # replay-cache
//!
//! A record/replay HTTP response cache for request-interception test tooling.
//!
//! An interception layer asks the cache whether a request has been seen
//! before; on a miss it performs the real request and stores the response,
//! which later runs replay from memory or from the on-disk fixtures.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use replay_cache::{Cache, CacheConfig};
//! use replay_cache::http::{Headers, Method, Response};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = Cache::new(CacheConfig::new().persist_to("fixtures/http"));
//!     let url = "https://api.example.com/v1/search?q=rust";
//!
//!     if let Some(entry) = cache.fetch(&Method::Get, url, None)? {
//!         println!("replaying {} bytes", entry.content.len());
//!     } else {
//!         // ...perform the real request, then:
//!         let response = Response::new(200).body("{\"hits\":[]}");
//!         cache.store(&Method::Get, url, &Headers::new(), None, response)?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use cache::body::canonicalize_body;
pub use cache::normalize::{NormalizedUrl, UrlNormalizer};
pub use cache::{Cache, CacheEntry, CacheKey, KeyGenerator, Scope, ScopeGuard};
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
