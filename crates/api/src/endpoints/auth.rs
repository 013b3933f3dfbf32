//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::{get, post}};
use rentora_common::AppResult;
use rentora_core::RegisterInput;
use rentora_db::entities::user::{self, Role};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, SessionToken},
    middleware::AppState,
    response::ApiResponse,
};

/// Public view of a user account.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Create a new account.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.account_service.register(req).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Verify credentials and open a session.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = state
        .account_service
        .authenticate(&req.email, &req.password)
        .await?;

    let token = state.sessions.create(&user.id)?;

    Ok(ApiResponse::ok(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// Logout response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub ok: bool,
}

/// End the current session. The session's wishlist goes with it.
async fn logout(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<LogoutResponse>> {
    state.sessions.destroy(&token);
    Ok(ApiResponse::ok(LogoutResponse { ok: true }))
}

/// The authenticated user's own account.
async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}
