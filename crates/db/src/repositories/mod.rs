//! Repositories for database operations.

mod booking;
mod photo;
mod property;
mod user;

pub use booking::BookingRepository;
pub use photo::PhotoRepository;
pub use property::{OwnerPropertyCount, PropertyFilter, PropertyRepository};
pub use user::UserRepository;
