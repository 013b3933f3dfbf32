//! API middleware.

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use rentora_common::StorageBackend;
use rentora_core::{
    AccountService, BookingService, DashboardService, ListingService, PropertyService,
    SessionStore, WishlistService,
};

use crate::extractors::SessionToken;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub listing_service: ListingService,
    pub property_service: PropertyService,
    pub wishlist_service: WishlistService,
    pub booking_service: BookingService,
    pub dashboard_service: DashboardService,
    pub sessions: SessionStore,
    pub storage: Arc<dyn StorageBackend>,
    pub maps_api_key: Option<String>,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to its session and loads the session's user
/// into the request extensions. Requests without a valid token pass
/// through anonymously; handlers that need a user reject them via the
/// extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let token = token.to_string();
                if let Some(session) = state.sessions.get(&token) {
                    if let Ok(user) = state.account_service.get(&session.user_id).await {
                        req.extensions_mut().insert(user);
                        req.extensions_mut().insert(SessionToken(token));
                    }
                }
            }
        }
    }

    next.run(req).await
}
