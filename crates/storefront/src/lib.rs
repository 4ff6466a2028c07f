//! Bozor storefront library.
//!
//! Client side of a marketplace built on a hosted backend: a document store,
//! an email/password auth provider and a public image host. This crate holds
//! the gateway to those services and the screens built on top of it.
//!
//! # Modules
//!
//! - [`store`] - Document store seam, REST client and in-memory double
//! - [`auth`] - Auth provider seam and the signed-in [`auth::Session`]
//! - [`images`] - Image host seam and upload client
//! - [`db`] - Repositories, one per collection
//! - [`services`] - Favorite toggle, chat poller, listing creation
//! - [`pages`] - Screen loaders and actions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod images;
pub mod pages;
pub mod services;
pub mod state;
pub mod store;
