//! Intercepted requests and their canonical form.

use crate::Error;
use crate::cache::hash::compute_request_key;

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string for consistent request identity.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase scheme and host (done by the parser for http/https)
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let mut parsed = parse(input)?;
    parsed.set_fragment(None);
    Ok(parsed)
}

/// Steps 1-3 of [`canonicalize`], keeping the fragment.
fn parse(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }
}

/// A request intercepted on its way to the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRequest {
    method: String,
    url: url::Url,
    /// Same URL with its fragment; policies match against this one.
    target: url::Url,
}

impl CacheRequest {
    /// Build a request, canonicalizing the URL and uppercasing the method.
    pub fn new(method: &str, url: &str) -> Result<Self, Error> {
        let method = method.trim();
        if method.is_empty() {
            return Err(Error::InvalidInput("method cannot be empty".into()));
        }
        let target = parse(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let mut url = target.clone();
        url.set_fragment(None);
        Ok(Self { method: method.to_ascii_uppercase(), url, target })
    }

    /// Shorthand for a `GET` request.
    pub fn get(url: &str) -> Result<Self, Error> {
        Self::new("GET", url)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Normalized URL with the fragment retained, for policy resolution.
    pub fn policy_url(&self) -> &str {
        self.target.as_str()
    }

    /// Request identity used as the bucket key.
    pub fn key(&self) -> String {
        compute_request_key(&self.method, self.url.as_str())
    }
}
