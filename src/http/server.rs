//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with one relay route per platform
//! - Wire up middleware (request ID, tracing, body limit)
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, RawQuery, State},
    http::{HeaderMap, Method},
    response::Response,
    routing::{any, get, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::health;
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::lifecycle::shutdown;
use crate::mapping::{MappingStore, Platform};
use crate::relay::{Forwarder, InboundRequest, Relay};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// HTTP server for the webhook relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server relaying through the given mapping store.
    pub fn new(config: RelayConfig, store: MappingStore) -> Result<Self, reqwest::Error> {
        let forwarder = Forwarder::new(&config.forwarding)?;
        let state = AppState {
            relay: Arc::new(Relay::new(store, forwarder)),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mut router = Router::new().route("/health", get(health::health_check));
        for platform in Platform::ALL {
            router = router.route(platform.path(), platform_route(platform));
        }

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(DefaultBodyLimit::max(config.forwarding.max_body_bytes)),
        )
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Relay route accepting any method for one platform.
fn platform_route(platform: Platform) -> MethodRouter<AppState> {
    any(
        move |State(state): State<AppState>,
              method: Method,
              RawQuery(query): RawQuery,
              headers: HeaderMap,
              body: Bytes| async move {
            relay_webhook(state, platform, method, query, headers, body).await
        },
    )
}

async fn relay_webhook(
    state: AppState,
    platform: Platform,
    method: Method,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = request_id(&headers);
    tracing::debug!(
        request_id = %request_id,
        platform = %platform,
        method = %method,
        body_bytes = body.len(),
        "Webhook received"
    );

    let inbound = InboundRequest {
        platform,
        method,
        query: InboundRequest::parse_query(query.as_deref()),
        headers,
        body,
    };
    state.relay.handle(inbound, &request_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingTable;
    use axum::{body::Body, http::{Request, StatusCode}};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn server(mappings: Value) -> HttpServer {
        let store = MappingStore::new(MappingTable::from_value(mappings).unwrap());
        HttpServer::new(RelayConfig::default(), store).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = server(json!({}))
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn unknown_platform_route_is_404() {
        let response = server(json!({}))
            .router()
            .oneshot(Request::post("/whatsapp").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unmapped_identifier_is_404_with_key() {
        let response = server(json!({ "messenger": {} }))
            .router()
            .oneshot(
                Request::post("/messenger")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"entry":[{"id":"123"}]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("'123'"));
    }

    #[tokio::test]
    async fn unconfigured_platform_is_404() {
        let response = server(json!({ "messenger": { "1": "http://d/x" } }))
            .router()
            .oneshot(Request::get("/instagram?id=1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("instagram"));
    }

    #[tokio::test]
    async fn invalid_destination_is_502() {
        let response = server(json!({ "messenger": { "default": "not a url" } }))
            .router()
            .oneshot(Request::post("/messenger").body(Body::from("x")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            json_body(response).await,
            json!({ "error": crate::relay::error::BAD_GATEWAY_MESSAGE })
        );
    }
}
