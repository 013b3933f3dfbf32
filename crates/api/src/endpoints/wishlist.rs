//! Session wishlist endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use rentora_common::AppResult;
use rentora_db::entities::property;
use serde::Serialize;

use crate::{
    extractors::{AuthUser, SessionToken},
    middleware::AppState,
    response::ApiResponse,
};

/// Wishlist entry: the property without its photos.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub id: String,
    pub title: String,
    pub location: String,
    pub price: f64,
}

impl From<property::Model> for WishlistEntry {
    fn from(p: property::Model) -> Self {
        Self {
            id: p.id,
            title: p.title,
            location: p.location,
            price: p.price,
        }
    }
}

/// Mutation result.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistChanged {
    pub changed: bool,
}

/// The session's wishlist, in the order items were added.
async fn list(
    AuthUser(_user): AuthUser,
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<WishlistEntry>>> {
    let properties = state.wishlist_service.list(&token).await?;
    Ok(ApiResponse::ok(
        properties.into_iter().map(Into::into).collect(),
    ))
}

/// Add a property to the wishlist.
async fn add(
    AuthUser(_user): AuthUser,
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> AppResult<ApiResponse<WishlistChanged>> {
    let changed = state.wishlist_service.add(&token, &property_id).await?;
    Ok(ApiResponse::ok(WishlistChanged { changed }))
}

/// Remove a property from the wishlist.
async fn remove(
    AuthUser(_user): AuthUser,
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> AppResult<ApiResponse<WishlistChanged>> {
    let changed = state.wishlist_service.remove(&token, &property_id)?;
    Ok(ApiResponse::ok(WishlistChanged { changed }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{property_id}", axum::routing::post(add).delete(remove))
}
