//! Hop-by-hop header stripping.
//!
//! Applied twice per relayed request: to the caller's headers before the
//! outbound call and to the destination's headers before mirroring.
//!
//! `HeaderMap` keeps order and repeated values but stores names in
//! lowercase, so the caller's original name casing is not reproduced.

use axum::http::{HeaderMap, HeaderName};

/// Headers that describe a single connection and must not be relayed.
pub const HOP_BY_HOP_HEADERS: [&str; 10] = [
    "transfer-encoding",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "upgrade",
    "content-length",
    "host",
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|denied| name.as_str().eq_ignore_ascii_case(denied))
}

/// Copy every non hop-by-hop entry, keeping order and repeated values.
pub fn sanitize_headers(headers: &HeaderMap) -> HeaderMap {
    let mut sanitized = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !is_hop_by_hop(name) {
            sanitized.append(name.clone(), value.clone());
        }
    }
    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn sample() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.append("Connection", HeaderValue::from_static("keep-alive"));
        headers.append("Content-Length", HeaderValue::from_static("42"));
        headers.append("X-Custom", HeaderValue::from_static("foo"));
        headers.append("Set-Cookie", HeaderValue::from_static("a=1"));
        headers.append("Set-Cookie", HeaderValue::from_static("b=2"));
        headers.append("HOST", HeaderValue::from_static("relay.local"));
        headers.append("Transfer-Encoding", HeaderValue::from_static("chunked"));
        headers.append("x-hub-signature-256", HeaderValue::from_static("sha256=abc"));
        headers
    }

    #[test]
    fn strips_denylisted_headers() {
        let sanitized = sanitize_headers(&sample());

        for name in HOP_BY_HOP_HEADERS {
            assert!(sanitized.get(name).is_none(), "{name} should be stripped");
        }
        assert_eq!(sanitized.get("x-custom").unwrap(), "foo");
        assert_eq!(sanitized.get("x-hub-signature-256").unwrap(), "sha256=abc");
    }

    #[test]
    fn keeps_repeated_values_in_order() {
        let sanitized = sanitize_headers(&sample());
        let cookies: Vec<_> = sanitized.get_all("set-cookie").iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
        assert_eq!(sanitized.len(), 4);
    }

    #[test]
    fn idempotent() {
        let once = sanitize_headers(&sample());
        let twice = sanitize_headers(&once);
        assert_eq!(once, twice);
    }
}
