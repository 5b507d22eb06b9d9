//! Freshness checks for stored responses.

use crate::response::StoredResponse;

/// Reserved header holding the absolute expiry in epoch milliseconds.
pub const EXPIRES_HEADER: &str = "sw-cache-expires";

/// Read the embedded expiry, if present and parseable.
pub fn expires_at(stored: &StoredResponse) -> Option<i64> {
    stored.headers.get(EXPIRES_HEADER).and_then(|v| v.trim().parse::<i64>().ok())
}

/// Whether a stored response may still be served at `now_ms`.
///
/// A missing or malformed expiry counts as expired, and so does `expiry == now`.
pub fn is_active(stored: &StoredResponse, now_ms: i64) -> bool {
    matches!(expires_at(stored), Some(expiry) if expiry > now_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::HeaderMap;
    use bytes::Bytes;

    fn stored_with(expiry: Option<&str>) -> StoredResponse {
        let mut headers = HeaderMap::new();
        if let Some(value) = expiry {
            headers.insert(EXPIRES_HEADER.to_string(), value.to_string());
        }
        StoredResponse { status: 200, status_text: "OK".into(), headers, body: Bytes::new() }
    }

    #[test]
    fn test_active_before_expiry() {
        assert!(is_active(&stored_with(Some("1000")), 999));
    }

    #[test]
    fn test_expired_at_boundary() {
        assert!(!is_active(&stored_with(Some("1000")), 1000));
    }

    #[test]
    fn test_expired_after() {
        assert!(!is_active(&stored_with(Some("1000")), 1001));
    }

    #[test]
    fn test_missing_header_is_expired() {
        assert!(!is_active(&stored_with(None), 0));
    }

    #[test]
    fn test_malformed_header_is_expired() {
        assert!(!is_active(&stored_with(Some("tomorrow")), 0));
        assert!(!is_active(&stored_with(Some("")), 0));
        assert_eq!(expires_at(&stored_with(Some("1.5e3"))), None);
    }

    #[test]
    fn test_negative_expiry_parses() {
        assert_eq!(expires_at(&stored_with(Some("-5"))), Some(-5));
        assert!(!is_active(&stored_with(Some("-5")), 0));
    }
}
