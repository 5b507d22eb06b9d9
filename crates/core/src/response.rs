//! Live and stored response records.
//!
//! [`LiveResponse`] is what the network hands back: its body can be taken
//! exactly once. [`StoredResponse`] is the plain record persisted in a bucket.
//! The two are kept distinct and converted explicitly with
//! [`live_response_to_stored`] and [`StoredResponse::into_live`].

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::freshness::EXPIRES_HEADER;

/// Header map with lowercased names.
pub type HeaderMap = BTreeMap<String, String>;

/// A response produced by the network fetch primitive or served from cache.
#[derive(Debug)]
pub struct LiveResponse {
    status: u16,
    status_text: String,
    headers: HeaderMap,
    body: Bytes,
}

impl LiveResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self { status, status_text: status_text.into(), headers: HeaderMap::new(), body: body.into() }
    }

    /// Add a header; the name is lowercased.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        for (name, value) in headers {
            self.headers.insert(name.to_ascii_lowercase(), value);
        }
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Consume the response, yielding its body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Split the response into two independently readable handles over the
    /// same payload.
    pub fn tee(self) -> (LiveResponse, LiveResponse) {
        let copy = LiveResponse {
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        };
        (self, copy)
    }
}

/// A response record as persisted in a cache bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl StoredResponse {
    /// Turn the record back into a response, verbatim, reserved header included.
    pub fn into_live(self) -> LiveResponse {
        LiveResponse { status: self.status, status_text: self.status_text, headers: self.headers, body: self.body }
    }
}

/// Stamp a live response with an absolute expiry and capture it as a stored record.
///
/// All live headers are copied; the reserved expiry header always carries
/// `expires_at`, even if the origin sent a header of the same name.
pub fn live_response_to_stored(live: LiveResponse, expires_at: i64) -> StoredResponse {
    let LiveResponse { status, status_text, mut headers, body } = live;
    headers.insert(EXPIRES_HEADER.to_string(), expires_at.to_string());
    StoredResponse { status, status_text, headers, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LiveResponse {
        LiveResponse::new(200, "OK", "hello")
            .with_header("Content-Type", "text/plain")
            .with_header("ETag", "\"abc\"")
    }

    #[test]
    fn test_header_names_lowercased() {
        let live = sample();
        assert_eq!(live.header("content-type"), Some("text/plain"));
        assert_eq!(live.header("CONTENT-TYPE"), Some("text/plain"));
        assert!(live.headers().contains_key("etag"));
    }

    #[test]
    fn test_tee_yields_independent_copies() {
        let (a, b) = sample().tee();
        assert_eq!(a.status(), b.status());
        assert_eq!(a.headers(), b.headers());
        assert_eq!(a.into_body(), Bytes::from_static(b"hello"));
        assert_eq!(b.into_body(), Bytes::from_static(b"hello"));
    }

    #[test]
    fn test_live_response_to_stored_adds_expiry() {
        let stored = live_response_to_stored(sample(), 1_234);
        assert_eq!(stored.status, 200);
        assert_eq!(stored.status_text, "OK");
        assert_eq!(stored.headers.get(EXPIRES_HEADER).map(String::as_str), Some("1234"));
        assert_eq!(stored.headers.get("content-type").map(String::as_str), Some("text/plain"));
        assert_eq!(stored.headers.len(), 3);
        assert_eq!(stored.body, Bytes::from_static(b"hello"));
    }

    #[test]
    fn test_origin_expiry_header_is_overridden() {
        let live = LiveResponse::new(200, "OK", "x").with_header(EXPIRES_HEADER, "99999999999999");
        let stored = live_response_to_stored(live, 5);
        assert_eq!(stored.headers.get(EXPIRES_HEADER).map(String::as_str), Some("5"));
    }

    #[test]
    fn test_into_live_is_verbatim() {
        let stored = live_response_to_stored(sample(), 10);
        let live = stored.clone().into_live();
        assert_eq!(live.status(), stored.status);
        assert_eq!(live.status_text(), stored.status_text);
        assert_eq!(live.headers(), &stored.headers);
        assert_eq!(live.into_body(), stored.body);
    }
}
