//! Outbound call to the resolved destination.
//!
//! # Responsibilities
//! - Build the outbound request from the relayed parts
//! - Bound the whole exchange (send + body read) by one deadline
//! - Classify failures into timeout vs everything else
//!
//! # Design Decisions
//! - Exactly one attempt per inbound request
//! - Redirects are mirrored, never followed
//! - Response bodies are buffered, not streamed

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use reqwest::redirect::Policy;
use thiserror::Error;
use url::Url;

use crate::config::ForwardingConfig;
use crate::mapping::RoutingKey;

/// Failure of the single outbound attempt. Both variants map to 502.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("destination did not respond within {0:?}")]
    Timeout(Duration),

    #[error("invalid destination url '{url}': {source}")]
    InvalidDestination {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to destination failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl ForwardError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ForwardError::Timeout(_))
    }
}

/// Everything needed for one outbound call.
#[derive(Debug)]
pub struct ForwardRequest<'a> {
    pub destination: Url,
    pub method: Method,
    /// Already stripped of hop-by-hop headers.
    pub headers: HeaderMap,
    pub body: Bytes,
    pub routing_key: Option<&'a RoutingKey>,
}

/// Buffered destination response.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Append the caller's query pairs to a mapped destination URL.
pub fn build_destination(base: &str, query: &[(String, String)]) -> Result<Url, ForwardError> {
    let mut url = Url::parse(base).map_err(|source| ForwardError::InvalidDestination {
        url: base.to_string(),
        source,
    })?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// Outbound HTTP client with a fixed per-attempt deadline.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    timeout: Duration,
    key_header: HeaderName,
}

impl Forwarder {
    pub fn new(config: &ForwardingConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout(),
            key_header: config.key_header(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform the outbound call and buffer the response.
    pub async fn forward(&self, request: ForwardRequest<'_>) -> Result<ForwardedResponse, ForwardError> {
        let ForwardRequest {
            destination,
            method,
            mut headers,
            body,
            routing_key,
        } = request;

        if let Some(key) = routing_key {
            match HeaderValue::from_str(key.as_str()) {
                Ok(value) => {
                    headers.insert(self.key_header.clone(), value);
                }
                Err(_) => {
                    tracing::warn!(key = %key, "Routing key is not a valid header value, not injecting");
                }
            }
        }

        let attach_body = method != Method::GET && method != Method::HEAD;
        let mut builder = self
            .client
            .request(method, destination)
            .headers(headers);
        if attach_body {
            builder = builder.body(body);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(ForwardedResponse { status, headers, body })
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) if e.is_timeout() => Err(ForwardError::Timeout(self.timeout)),
            Ok(Err(e)) => Err(ForwardError::Request(e)),
            Err(_) => Err(ForwardError::Timeout(self.timeout)),
        }
    }
}
