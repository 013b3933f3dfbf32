//! HTTP API layer for rentora.
//!
//! - **Endpoints**: auth, property listings, wishlist, bookings, dashboard
//! - **Extractors**: authenticated user, session token
//! - **Middleware**: bearer-token session resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
