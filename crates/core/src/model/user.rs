//! User profile records and account forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, lenient, require};
use crate::types::{Email, Phone, UserId};

/// Minimum password length accepted by the auth provider.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Profile document at `users/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Auth provider uid; also the document key.
    #[serde(skip_serializing, default)]
    pub id: UserId,
    /// Name shown to chat partners.
    #[serde(default, deserialize_with = "lenient::text")]
    pub display_name: String,
    /// Sign-in email.
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    /// Contact phone, if given.
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub phone: Option<String>,
    /// When the profile was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the profile was last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Label shown in place of a missing display name.
    pub const FALLBACK_NAME: &'static str = "Пользователь";

    /// Display name, or the generic fallback when none is set.
    #[must_use]
    pub fn name_or_fallback(&self) -> &str {
        let name = self.display_name.trim();
        if name.is_empty() {
            Self::FALLBACK_NAME
        } else {
            name
        }
    }
}

/// Sign-up form.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Validated email.
    pub email: Email,
    /// Plain password, forwarded to the auth provider only.
    pub password: String,
    /// Display name.
    pub display_name: String,
}

impl Registration {
    /// Validate the sign-up form.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed or the password is shorter
    /// than [`MIN_PASSWORD_LENGTH`].
    pub fn new(email: &str, password: &str, display_name: &str) -> Result<Self, ValidationError> {
        let email = Email::parse(email)?;
        check_password(password)?;
        Ok(Self {
            email,
            password: password.to_owned(),
            display_name: display_name.trim().to_owned(),
        })
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// New phone number, as typed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    /// Build an update from form input. Blank fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-blank phone number is malformed.
    pub fn new(display_name: &str, phone: &str) -> Result<Self, ValidationError> {
        let display_name = Some(display_name.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let phone = match phone.trim() {
            "" => None,
            raw => Some(Phone::parse(raw)?.as_str().to_owned()),
        };
        Ok(Self {
            display_name,
            phone,
        })
    }

    /// Whether there is nothing to write.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.phone.is_none()
    }
}

/// Password change form. The current password is needed to re-authenticate.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    /// Password the user signs in with now.
    pub current: String,
    /// Replacement password.
    pub new: String,
}

impl PasswordChange {
    /// Validate the password change form.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is blank, the new password is too short,
    /// or the confirmation does not match.
    pub fn new(current: &str, new: &str, confirm: &str) -> Result<Self, ValidationError> {
        require(&[
            ("Текущий пароль", !current.is_empty()),
            ("Новый пароль", !new.is_empty()),
            ("Подтверждение пароля", !confirm.is_empty()),
        ])?;
        check_password(new)?;
        if new != confirm {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(Self {
            current: current.to_owned(),
            new: new.to_owned(),
        })
    }
}

fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}
