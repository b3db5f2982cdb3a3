//! URL canonicalization.
//!
//! Turns a request URL into `scheme://host[:port]path[?query][#fragment]`,
//! the string that key derivation hashes.

use url::{Url, form_urlencoded};

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};

/// A canonical URL string together with its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    host: String,
    url: String,
}

impl NormalizedUrl {
    /// Lower-cased host, as used for the key prefix and generator lookup.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn into_string(self) -> String {
        self.url
    }
}

/// Canonicalizes URLs according to the port and dynamic-parameter settings.
///
/// # Examples
///
/// ```
/// use replay_cache::{CacheConfig, UrlNormalizer};
///
/// let config = CacheConfig::new().dynamic_jsonp(["callback"]);
/// let normalizer = UrlNormalizer::from_config(&config);
///
/// let url = normalizer
///     .normalize("http://Example.com:8080/feed?callback=jq123&id=7#top", false)
///     .unwrap();
/// assert_eq!(url.as_str(), "http://example.com/feed?id=7#top");
/// ```
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    ignore_port: bool,
    rewrite_dynamic: bool,
    dynamic_keys: Vec<String>,
}

impl UrlNormalizer {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            ignore_port: config.ignore_cache_port,
            rewrite_dynamic: config.dynamic_jsonp,
            dynamic_keys: config.dynamic_jsonp_keys.clone(),
        }
    }

    /// Normalizes `raw` using the configured dynamic-parameter rewrite setting.
    ///
    /// With `strip_params`, the query and fragment are dropped entirely.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidUrl`] if `raw` does not parse, and
    /// [`CacheError::MissingHost`] if it has no host.
    pub fn normalize(&self, raw: &str, strip_params: bool) -> CacheResult<NormalizedUrl> {
        self.normalize_with(raw, strip_params, self.rewrite_dynamic)
    }

    /// Like [`normalize`](Self::normalize) with an explicit rewrite flag.
    pub fn normalize_with(
        &self,
        raw: &str,
        strip_params: bool,
        rewrite_dynamic: bool,
    ) -> CacheResult<NormalizedUrl> {
        let parsed = Url::parse(raw).map_err(|source| CacheError::InvalidUrl {
            url: raw.to_owned(),
            source,
        })?;
        let host = parsed
            .host_str()
            .ok_or_else(|| CacheError::MissingHost {
                url: raw.to_owned(),
            })?
            .to_owned();

        let mut url = format!("{}://{}", parsed.scheme(), host);
        if !self.ignore_port {
            if let Some(port) = parsed.port_or_known_default() {
                url.push(':');
                url.push_str(&port.to_string());
            }
        }
        url.push_str(parsed.path());

        if strip_params {
            return Ok(NormalizedUrl { host, url });
        }

        if let Some(query) = parsed.query() {
            let query = if rewrite_dynamic {
                self.strip_dynamic(&parsed)
            } else {
                query.to_owned()
            };
            url.push('?');
            url.push_str(&query);
        }

        if let Some(fragment) = parsed.fragment() {
            url.push('#');
            url.push_str(fragment);
        }

        Ok(NormalizedUrl { host, url })
    }

    fn strip_dynamic(&self, parsed: &Url) -> String {
        let kept = parsed
            .query_pairs()
            .filter(|(name, _)| !self.dynamic_keys.iter().any(|d| d == name));
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(kept)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer(config: CacheConfig) -> UrlNormalizer {
        UrlNormalizer::from_config(&config)
    }

    #[test]
    fn port_dropped_by_default() {
        let n = normalizer(CacheConfig::new());
        let url = n.normalize("http://example.com:3000/a/b", false).unwrap();
        assert_eq!(url.as_str(), "http://example.com/a/b");
        assert_eq!(url.host(), "example.com");
    }

    #[test]
    fn port_kept_including_known_default() {
        let n = normalizer(CacheConfig::new().ignore_cache_port(false));
        assert_eq!(
            n.normalize("http://example.com/a", false).unwrap().as_str(),
            "http://example.com:80/a"
        );
        assert_eq!(
            n.normalize("https://example.com:8443/a", false).unwrap().as_str(),
            "https://example.com:8443/a"
        );
    }

    #[test]
    fn strip_params_drops_query_and_fragment() {
        let n = normalizer(CacheConfig::new());
        let url = n.normalize("http://example.com/a?x=1#frag", true).unwrap();
        assert_eq!(url.as_str(), "http://example.com/a");
    }

    #[test]
    fn query_kept_verbatim_without_rewrite() {
        let n = normalizer(CacheConfig::new());
        let url = n
            .normalize("http://example.com/a?b=2&a=1&callback=x", false)
            .unwrap();
        assert_eq!(url.as_str(), "http://example.com/a?b=2&a=1&callback=x");
    }

    #[test]
    fn rewrite_removes_dynamic_keys_and_keeps_order() {
        let n = normalizer(CacheConfig::new().dynamic_jsonp(["callback", "_"]));
        let url = n
            .normalize("http://example.com/a?b=2&callback=jq1&a=1&_=99", false)
            .unwrap();
        assert_eq!(url.as_str(), "http://example.com/a?b=2&a=1");
    }

    #[test]
    fn rewrite_to_empty_query_keeps_question_mark() {
        let n = normalizer(CacheConfig::new().dynamic_jsonp(["callback"]));
        let url = n.normalize("http://example.com/a?callback=jq1", false).unwrap();
        assert_eq!(url.as_str(), "http://example.com/a?");
    }

    #[test]
    fn empty_query_differs_from_no_query() {
        let n = normalizer(CacheConfig::new());
        let bare = n.normalize("http://example.com/a", false).unwrap();
        let empty = n.normalize("http://example.com/a?", false).unwrap();
        assert_eq!(empty.as_str(), "http://example.com/a?");
        assert_ne!(bare, empty);
        assert_eq!(n.normalize(empty.as_str(), false).unwrap(), empty);
    }

    #[test]
    fn explicit_rewrite_flag_overrides_config() {
        let n = normalizer(CacheConfig::new());
        let url = n
            .normalize_with("http://example.com/a?callback=1&x=2", false, true)
            .unwrap();
        assert_eq!(url.as_str(), "http://example.com/a?x=2");
    }

    #[test]
    fn fragment_appended() {
        let n = normalizer(CacheConfig::new());
        let url = n.normalize("http://example.com/a#section", false).unwrap();
        assert_eq!(url.as_str(), "http://example.com/a#section");
    }

    #[test]
    fn idempotent() {
        for config in [
            CacheConfig::new(),
            CacheConfig::new().ignore_cache_port(false),
            CacheConfig::new().dynamic_jsonp(["callback"]),
        ] {
            let n = normalizer(config);
            for raw in [
                "http://Example.com:8080/p%20q?a=1&b=two+words&callback=z#f",
                "https://example.com",
                "http://example.com/x?flag",
            ] {
                let once = n.normalize(raw, false).unwrap();
                let twice = n.normalize(once.as_str(), false).unwrap();
                assert_eq!(once, twice, "not idempotent for {raw}");
            }
        }
    }

    #[test]
    fn invalid_url_is_error() {
        let n = normalizer(CacheConfig::new());
        assert!(matches!(
            n.normalize("not a url", false),
            Err(CacheError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn hostless_url_is_error() {
        let n = normalizer(CacheConfig::new());
        assert!(matches!(
            n.normalize("data:text/plain,hello", false),
            Err(CacheError::MissingHost { .. })
        ));
    }
}
