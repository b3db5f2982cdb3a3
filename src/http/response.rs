//! Recorded upstream response.
//!
//! The interception layer performs the real request and describes what came
//! back with a [`Response`], which [`Cache::store`](crate::Cache::store) turns
//! into a [`CacheEntry`](crate::CacheEntry).

use bytes::Bytes;

use super::Headers;

/// An upstream HTTP response, as observed by the interception layer.
///
/// The status is kept as a raw `u16` so that any code the upstream sends can
/// be replayed verbatim.
///
/// # Examples
///
/// ```
/// use replay_cache::http::Response;
///
/// let response = Response::new(200)
///     .header("Content-Type", "application/json")
///     .body(r#"{"status":"ok"}"#);
///
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.headers().get("content-type"), Some("application/json"));
/// assert_eq!(&response.content()[..], br#"{"status":"ok"}"#);
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: Bytes,
}

impl Response {
    /// Creates a new response with the given status and an empty body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Appends a response header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the response body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the raw response body.
    pub fn content(&self) -> &Bytes {
        &self.body
    }

    pub(crate) fn into_parts(self) -> (u16, Headers, Bytes) {
        (self.status, self.headers, self.body)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200)
    }
}
