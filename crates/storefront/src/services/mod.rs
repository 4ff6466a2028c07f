//! Client-side flows built on the repositories.
//!
//! # Services
//!
//! - [`favorites`] - Optimistic favorite toggle with rollback
//! - [`chat_poller`] - Fixed-interval message refresh for an open chat
//! - [`listings`] - Product creation with best-effort image upload

pub mod chat_poller;
pub mod favorites;
pub mod listings;

pub use chat_poller::ChatPoller;
pub use favorites::FavoriteToggle;
pub use listings::create_listing;
