//! Booking endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use rentora_common::AppResult;
use rentora_core::CreateBookingInput;
use rentora_db::entities::booking;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// A booking record.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    pub property_id: String,
    pub check_in: String,
    pub check_out: String,
    pub guests: i32,
    pub created_at: String,
}

impl From<booking::Model> for BookingResponse {
    fn from(b: booking::Model) -> Self {
        Self {
            id: b.id,
            property_id: b.property_id,
            check_in: b.check_in.to_string(),
            check_out: b.check_out.to_string(),
            guests: b.guests,
            created_at: b.created_at.to_rfc3339(),
        }
    }
}

/// Book a property.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(property_id): Path<String>,
    Json(req): Json<CreateBookingInput>,
) -> AppResult<ApiResponse<BookingResponse>> {
    let booking = state
        .booking_service
        .create(&user, &property_id, req)
        .await?;
    Ok(ApiResponse::ok(booking.into()))
}

/// The authenticated user's bookings, most recent first.
async fn history(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<BookingResponse>>> {
    let bookings = state.booking_service.history(&user.id).await?;
    Ok(ApiResponse::ok(
        bookings.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(history))
        .route("/{property_id}", post(create))
}
