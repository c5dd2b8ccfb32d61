use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

use crate::admin::AdminState;
use crate::mapping::MappingTable;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub platforms: Vec<String>,
    pub entries: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let table = state.store.snapshot();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        platforms: table.platform_names().map(str::to_string).collect(),
        entries: table.entry_count(),
    })
}

pub async fn get_mappings(State(state): State<AdminState>) -> Json<MappingTable> {
    Json(MappingTable::clone(&state.store.snapshot()))
}

pub async fn reload_mappings(State(state): State<AdminState>) -> impl IntoResponse {
    tracing::info!(path = %state.mappings_path.display(), "Reload requested via admin API");
    match state.store.reload_from(&state.mappings_path) {
        Ok(entries) => (
            StatusCode::OK,
            Json(json!({ "reloaded": true, "entries": entries })),
        ),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string() })),
        ),
    }
}
