//! Fully buffered HTTP responses

use super::rate_limit::RateLimitInfo;
use crate::error::Result;
use bytes::Bytes;
use reqwest::header::{HeaderMap, ETAG};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// A response whose body has been read in full.
///
/// Responses served from the ETag cache are byte-for-byte copies of the
/// original, including the rate limit snapshot taken when it was first
/// fetched.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    rate_limit: Option<RateLimitInfo>,
    from_cache: bool,
}

impl Response {
    /// Create a response from its parts
    pub fn new(
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
        rate_limit: Option<RateLimitInfo>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            rate_limit,
            from_cache: false,
        }
    }

    /// Copy of this response marked as served from cache
    pub(crate) fn cached_copy(&self) -> Self {
        Self {
            from_cache: true,
            ..self.clone()
        }
    }

    /// HTTP status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Canonical reason phrase for the status
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown")
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether the status is 404
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Validator (ETag) carried by the response
    pub fn etag(&self) -> Option<&str> {
        self.headers.get(ETAG).and_then(|v| v.to_str().ok())
    }

    /// Rate limit state at the time the body was fetched
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }

    /// Whether this response was served from the ETag cache
    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    /// Raw body
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Take ownership of the body
    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// Body decoded as UTF-8 (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body deserialized from JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_response_accessors() {
        let mut headers = HeaderMap::new();
        headers.insert(ETAG, HeaderValue::from_static("\"v1\""));
        let response = Response::new(
            StatusCode::OK,
            headers,
            Bytes::from_static(br#"{"value": 42}"#),
            None,
        );

        assert!(response.is_success());
        assert!(!response.is_not_found());
        assert_eq!(response.reason(), "OK");
        assert_eq!(response.etag(), Some("\"v1\""));
        assert!(!response.from_cache());

        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["value"], 42);
    }

    #[test]
    fn test_cached_copy() {
        let response = Response::new(StatusCode::OK, HeaderMap::new(), Bytes::from_static(b"abc"), None);
        let cached = response.cached_copy();

        assert!(cached.from_cache());
        assert_eq!(cached.bytes(), response.bytes());
        assert_eq!(cached.text(), "abc");
    }

    #[test]
    fn test_json_error() {
        let response = Response::new(StatusCode::OK, HeaderMap::new(), Bytes::from_static(b"nope"), None);
        assert!(response.json::<serde_json::Value>().is_err());
    }
}
