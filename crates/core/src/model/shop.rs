//! Shop records and the shop form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, lenient, require};
use crate::types::{Email, Phone, ShopId, UserId};

/// Shop document at `shops/{ownerUid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    /// Document key, equal to the owner's uid.
    #[serde(skip_serializing, default)]
    pub id: ShopId,
    /// Owner uid.
    #[serde(default)]
    pub owner_id: UserId,
    /// Shop name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Contact phone.
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: String,
    /// Contact email.
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    /// Telegram handle.
    #[serde(default, deserialize_with = "lenient::text")]
    pub telegram: String,
    /// Website URL.
    #[serde(default, deserialize_with = "lenient::text")]
    pub website: String,
    /// Street address.
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: String,
    /// City used for search ordering.
    #[serde(default, deserialize_with = "lenient::text")]
    pub city: String,
    /// Whether the shop delivers.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub has_delivery: bool,
    /// Free-form description.
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    /// When the shop was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the shop was last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Shop {
    /// The uid of the owner. Falls back to the document key for shops
    /// written without an `ownerId` field.
    #[must_use]
    pub fn owner(&self) -> UserId {
        if self.owner_id.as_str().is_empty() {
            self.id.owner()
        } else {
            self.owner_id.clone()
        }
    }
}

/// Shop create/edit form, validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopDraft {
    /// Shop name.
    pub name: String,
    /// Contact phone, as typed.
    pub phone: String,
    /// Contact email.
    pub email: String,
    /// Telegram handle.
    pub telegram: String,
    /// Website URL.
    pub website: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Whether the shop delivers.
    pub has_delivery: bool,
    /// Free-form description.
    pub description: String,
}

impl ShopDraft {
    /// Validate a shop form.
    ///
    /// Name, phone, email and address are required; phone and email must
    /// also be well-formed. Other fields are trimmed and may be blank.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] listing every blank required
    /// field, or the first contact-format error.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        for field in [
            &mut self.name,
            &mut self.phone,
            &mut self.email,
            &mut self.telegram,
            &mut self.website,
            &mut self.address,
            &mut self.city,
            &mut self.description,
        ] {
            *field = field.trim().to_owned();
        }

        require(&[
            ("Название", !self.name.is_empty()),
            ("Телефон", !self.phone.is_empty()),
            ("Email", !self.email.is_empty()),
            ("Адрес", !self.address.is_empty()),
        ])?;

        Phone::parse(&self.phone)?;
        self.email = Email::parse(&self.email)?.into_inner();
        Ok(self)
    }
}
