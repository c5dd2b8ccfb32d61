pub mod auth;
pub mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::mapping::MappingStore;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub store: MappingStore,
    pub mappings_path: PathBuf,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/mappings", get(get_mappings))
        .route("/admin/reload", post(reload_mappings))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
