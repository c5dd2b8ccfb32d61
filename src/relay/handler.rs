//! Per-request relay orchestration.
//!
//! # Flow
//! ```text
//! RECEIVED ──▶ RESOLVING ──▶ FORWARDING ──▶ RESPONDING ──▶ MIRRORED
//!                  │              │
//!                  ▼              ▼
//!              NOT_FOUND     BAD_GATEWAY
//!                (404)          (502)
//! ```

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::mapping::{extract_identifier, query_candidates, resolve, MappingStore, Platform};
use crate::observability::metrics;
use crate::relay::error::RelayError;
use crate::relay::forwarder::{build_destination, ForwardRequest, ForwardedResponse, Forwarder};
use crate::relay::headers::sanitize_headers;

/// A webhook call as received from the platform.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub platform: Platform,
    pub method: Method,
    pub headers: HeaderMap,
    /// Raw bytes, forwarded untouched.
    pub body: Bytes,
    /// Decoded query pairs in order of appearance.
    pub query: Vec<(String, String)>,
}

impl InboundRequest {
    /// Decode a raw query string into ordered pairs.
    pub fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
        raw.map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
    }

    /// Parsed body when it is declared as JSON and parses cleanly.
    pub fn json_body(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        let is_json = self
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().contains("json"))
            .unwrap_or(false);
        if !is_json {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }

    /// Body identifier first, then query identifiers by field precedence.
    pub fn candidates(&self) -> Vec<String> {
        let body = self.json_body();
        extract_identifier(body.as_ref())
            .into_iter()
            .chain(query_candidates(&self.query))
            .collect()
    }
}

/// The relay core: mapping lookup plus forwarding.
#[derive(Debug, Clone)]
pub struct Relay {
    store: MappingStore,
    forwarder: Forwarder,
}

impl Relay {
    pub fn new(store: MappingStore, forwarder: Forwarder) -> Self {
        Self { store, forwarder }
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    /// Run one request to a terminal state and render the response.
    pub async fn handle(&self, request: InboundRequest, request_id: &str) -> Response {
        let start = Instant::now();
        let platform = request.platform;

        match self.evaluate(request, request_id).await {
            Ok(mirrored) => {
                let status = mirrored.status;
                metrics::record_relay(platform.as_str(), "mirrored", status.as_u16(), start);
                mirror(mirrored)
            }
            Err(e) => {
                let status = e.status_code();
                match &e {
                    RelayError::Resolve(cause) => {
                        tracing::warn!(request_id = %request_id, platform = %platform, error = %cause, "Unable to resolve destination");
                    }
                    RelayError::Forward(cause) => {
                        tracing::error!(request_id = %request_id, platform = %platform, error = %cause, "Forwarding failed");
                    }
                }
                metrics::record_relay(platform.as_str(), e.outcome(), status.as_u16(), start);
                e.into_response()
            }
        }
    }

    async fn evaluate(
        &self,
        request: InboundRequest,
        request_id: &str,
    ) -> Result<ForwardedResponse, RelayError> {
        let candidates = request.candidates();
        let snapshot = self.store.snapshot();
        let resolution = resolve(&snapshot, request.platform, &candidates)?;
        drop(snapshot);

        let destination = build_destination(&resolution.destination, &request.query)?;

        tracing::info!(
            request_id = %request_id,
            platform = %request.platform,
            method = %request.method,
            key = %resolution.key,
            destination = %destination,
            "Forwarding webhook"
        );

        let response = self
            .forwarder
            .forward(ForwardRequest {
                destination,
                method: request.method,
                headers: sanitize_headers(&request.headers),
                body: request.body,
                routing_key: Some(&resolution.key),
            })
            .await?;

        tracing::debug!(
            request_id = %request_id,
            status = %response.status,
            bytes = response.body.len(),
            "Destination responded"
        );
        Ok(response)
    }
}

fn mirror(forwarded: ForwardedResponse) -> Response {
    let mut response = Response::new(Body::from(forwarded.body));
    *response.status_mut() = forwarded.status;
    *response.headers_mut() = sanitize_headers(&forwarded.headers);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn inbound(content_type: Option<&str>, body: &'static [u8], query: Option<&str>) -> InboundRequest {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        }
        InboundRequest {
            platform: Platform::Messenger,
            method: Method::POST,
            headers,
            body: Bytes::from_static(body),
            query: InboundRequest::parse_query(query),
        }
    }

    #[test]
    fn body_identifier_precedes_query() {
        let req = inbound(
            Some("application/json; charset=utf-8"),
            br#"{"entry":[{"id":"body"}]}"#,
            Some("ig_id=ig&id=q1&page_id=p&id=q2"),
        );
        assert_eq!(req.candidates(), vec!["body", "q1", "q2", "p", "ig"]);
    }

    #[test]
    fn non_json_content_type_is_not_parsed() {
        let req = inbound(Some("text/plain"), br#"{"entry":[{"id":"body"}]}"#, None);
        assert!(req.json_body().is_none());
        assert!(req.candidates().is_empty());
    }

    #[test]
    fn unparseable_json_is_ignored() {
        let req = inbound(Some("application/json"), b"{not json", Some("id=7"));
        assert!(req.json_body().is_none());
        assert_eq!(req.candidates(), vec!["7"]);
    }

    #[test]
    fn query_is_percent_decoded() {
        let pairs = InboundRequest::parse_query(Some("id=a%20b&x=1&x=2"));
        assert_eq!(
            pairs,
            vec![
                ("id".to_string(), "a b".to_string()),
                ("x".to_string(), "1".to_string()),
                ("x".to_string(), "2".to_string()),
            ]
        );
        assert!(InboundRequest::parse_query(None).is_empty());
    }

    #[test]
    fn mirror_strips_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("x-custom", HeaderValue::from_static("foo"));
        let response = mirror(ForwardedResponse {
            status: StatusCode::IM_A_TEAPOT,
            headers,
            body: Bytes::from_static(b"short and stout"),
        });

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert!(response.headers().get("connection").is_none());
        assert_eq!(response.headers().get("x-custom").unwrap(), "foo");
    }
}
