//! Entity records stored in the hosted document store.
//!
//! Each entity has a record type (what a document reads back as) and, where
//! users create it through a form, a draft type validated before any network
//! call. Records tolerate missing fields: absent numbers read as zero and
//! absent flags as `false`, because older documents were written without a
//! schema.

pub mod chat;
pub mod favorite;
pub mod product;
pub mod shop;
pub mod task;
pub mod user;

mod lenient;

pub use chat::{Chat, ChatRole, Message, MessageDraft};
pub use favorite::Favorite;
pub use product::{Product, ProductDraft, ProductPatch};
pub use shop::{Shop, ShopDraft};
pub use task::{Task, TaskDraft, TaskTab};
pub use user::{PasswordChange, ProfileUpdate, Registration, UserProfile};

use thiserror::Error;

use crate::types::{EmailError, PhoneError};

/// Errors raised when a draft fails validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields are blank. Holds the form labels.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Email address is malformed.
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),

    /// Phone number is malformed.
    #[error("invalid phone: {0}")]
    Phone(#[from] PhoneError),

    /// Date is not in `YYYY-MM-DD` form.
    #[error("invalid date: {0}")]
    Date(String),

    /// Password shorter than the auth provider accepts.
    #[error("password must be at least {min} characters")]
    WeakPassword {
        /// Minimum length.
        min: usize,
    },

    /// New password and its confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// A buyer tried to open a chat with their own shop.
    #[error("cannot start a chat with yourself")]
    SelfChat,

    /// Message is empty after trimming.
    #[error("message is empty")]
    EmptyMessage,
}

/// Collect the labels of blank required fields.
pub(crate) fn require(fields: &[(&'static str, bool)]) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(label, _)| *label)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_lists_missing_labels_in_order() {
        let err = require(&[("Название", false), ("Телефон", true), ("Адрес", false)]);
        assert_eq!(
            err,
            Err(ValidationError::MissingFields(vec!["Название", "Адрес"]))
        );
        assert_eq!(
            err.unwrap_err().to_string(),
            "missing required fields: Название, Адрес"
        );
    }

    #[test]
    fn test_require_passes_when_all_present() {
        assert_eq!(require(&[("Название", true)]), Ok(()));
    }
}
