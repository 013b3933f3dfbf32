//! Database entities.

pub mod booking;
pub mod photo;
pub mod property;
pub mod user;

pub use booking::Entity as Booking;
pub use photo::Entity as Photo;
pub use property::Entity as Property;
pub use user::Entity as User;
