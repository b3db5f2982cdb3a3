//! Records a response, drops the in-memory cache, and replays it from disk.
//!
//! Run with `RUST_LOG=debug cargo run --example record_replay` to watch keys
//! being derived and records being written.

use replay_cache::http::{Headers, Method, Response};
use replay_cache::{Cache, CacheConfig, Scope};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let dir = std::env::temp_dir().join("replay-cache-demo");
    let cache = Cache::new(
        CacheConfig::new()
            .persist_to(&dir)
            .dynamic_jsonp(["callback"]),
    );

    let url = "http://api.example.com/feed?id=42&callback=jQuery1234";
    let body = r#"{"page":1,"filter":"all"}"#;

    cache.with_scope(Some(Scope::from("demo")), || -> Result<(), Box<dyn std::error::Error>> {
        if !cache.is_cached(&Method::Post, url, Some(body))? {
            let response = Response::new(200)
                .header("Content-Type", "application/javascript")
                .body("jQuery1234({\"items\":[]})");
            let key = cache.store(&Method::Post, url, &Headers::new(), Some(body), response)?;
            println!("recorded {key}");
        }

        cache.reset();

        // Different callback name and key order, same logical request.
        let replay_url = "http://api.example.com/feed?id=42&callback=jQuery9999";
        let replay_body = r#"{"filter":"all","page":1}"#;
        match cache.fetch(&Method::Post, replay_url, Some(replay_body))? {
            Some(entry) => println!(
                "replayed {} from {} ({} bytes)",
                entry.status,
                dir.display(),
                entry.content.len()
            ),
            None => println!("nothing recorded"),
        }
        Ok(())
    })
}
