//! Bozor Core - Shared domain library.
//!
//! This crate provides the types used across all Bozor components:
//! - `storefront` - Gateway to the hosted document store, auth and image host
//! - `cli` - Command-line tools for searching and seeding the store
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no network
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, contacts and statuses
//! - [`model`] - Entity records and the drafts used to create them
//! - [`search`] - Client-side product filtering and ordering

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod model;
pub mod search;
pub mod types;

pub use model::*;
pub use types::*;
