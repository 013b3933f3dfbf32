//! Dashboard endpoint.

use axum::{Router, extract::State, routing::get};
use rentora_common::AppResult;
use rentora_core::DashboardView;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// The role-dependent dashboard.
async fn dashboard(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<DashboardView>> {
    let view = state.dashboard_service.view(&user).await?;
    Ok(ApiResponse::ok(view))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}
