//! Business logic services.

pub mod access;
pub mod account;
pub mod booking;
pub mod dashboard;
pub mod listing;
pub mod property;
pub mod session;
pub mod wishlist;

pub use access::{require_owner_or_admin, require_role};
pub use account::{AccountService, RegisterInput};
pub use booking::{BookingService, CreateBookingInput};
pub use dashboard::{DashboardService, DashboardView, OwnerCount};
pub use listing::ListingService;
pub use property::{PhotoUpload, PropertyInput, PropertyService};
pub use session::{Session, SessionStore, Wishlist, MAX_WISHLIST_ENTRIES};
pub use wishlist::WishlistService;
