//! Booking service.

use chrono::NaiveDate;
use rentora_common::{AppError, AppResult, IdGenerator};
use rentora_db::{
    entities::{booking, user},
    repositories::{BookingRepository, PropertyRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Booking creation and per-user history.
///
/// Bookings are pure records: overlapping date ranges on the same property
/// are accepted.
#[derive(Clone)]
pub struct BookingService {
    booking_repo: BookingRepository,
    property_repo: PropertyRepository,
    id_gen: IdGenerator,
}

/// Input for creating a booking.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingInput {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1))]
    pub guests: i32,
}

impl BookingService {
    /// Create a new booking service.
    #[must_use]
    pub const fn new(booking_repo: BookingRepository, property_repo: PropertyRepository) -> Self {
        Self {
            booking_repo,
            property_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Book a property for the authenticated user.
    pub async fn create(
        &self,
        user: &user::Model,
        property_id: &str,
        input: CreateBookingInput,
    ) -> AppResult<booking::Model> {
        input.validate()?;

        if input.check_out <= input.check_in {
            return Err(AppError::Validation(
                "Check-out must be after check-in".to_string(),
            ));
        }

        let property = self.property_repo.get_by_id(property_id).await?;

        let model = booking::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user.id.clone()),
            property_id: Set(property.id),
            check_in: Set(input.check_in),
            check_out: Set(input.check_out),
            guests: Set(input.guests),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.booking_repo.create(model).await
    }

    /// The authenticated user's booking history, most recent first.
    pub async fn history(&self, user_id: &str) -> AppResult<Vec<booking::Model>> {
        self.booking_repo.find_by_user(user_id).await
    }
}
