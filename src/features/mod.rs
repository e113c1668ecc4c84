pub mod auth;
pub mod catalog;
pub mod connection;
pub mod favorites;
pub mod messages;
pub mod reports;
pub mod types;

pub use auth::{AuthState, ProfilePatch};
pub use catalog::{filter_listings, Catalog, ListingPatch, NewListing, PRODUCT_CATEGORIES};
pub use connection::ConnectionStatus;
pub use favorites::Favorites;
pub use messages::{Conversation, MessageBox, Messages, NewMessage, DEFAULT_SUBJECT};
pub use reports::{NewReport, Reports, ReviewOutcome};
pub use types::{ListingFilter, PriceRange, SortKey};
