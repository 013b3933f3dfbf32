//! API endpoints.

mod auth;
mod bookings;
mod dashboard;
mod meta;
mod properties;
mod wishlist;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/meta", meta::router())
        .nest("/properties", properties::router())
        .nest("/wishlist", wishlist::router())
        .nest("/bookings", bookings::router())
        .nest("/dashboard", dashboard::router())
}
