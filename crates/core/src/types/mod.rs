//! Core types for Bozor.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod contact;
pub mod id;
pub mod price;
pub mod status;

pub use category::Category;
pub use contact::{Email, EmailError, Phone, PhoneError};
pub use id::*;
pub use price::{DiscountPercent, Price};
pub use status::*;
