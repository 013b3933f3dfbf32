//! Instance metadata endpoint.

use axum::{Router, extract::State, routing::get};
use rentora_common::AppResult;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Instance metadata, for clients.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub name: &'static str,
    pub version: &'static str,
    /// Map provider key for rendering listing locations, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maps_api_key: Option<String>,
}

async fn meta(State(state): State<AppState>) -> AppResult<ApiResponse<MetaResponse>> {
    Ok(ApiResponse::ok(MetaResponse {
        name: "rentora",
        version: env!("CARGO_PKG_VERSION"),
        maps_api_key: state.maps_api_key.clone(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(meta))
}
