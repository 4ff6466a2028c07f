//! Email/password authentication against the hosted auth provider.
//!
//! [`AuthProvider`] is the seam: [`IdentityClient`] calls the provider's
//! REST API, [`InMemoryAuth`] backs tests. The signed-in user is held by a
//! [`Session`], which callers pass to whatever needs the current user.

mod identity;
mod memory;
mod session;

pub use identity::IdentityClient;
pub use memory::InMemoryAuth;
pub use session::{Session, SessionSubscription};

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use bozor_core::{Email, UserId, ValidationError};

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Form input failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password rejected by the provider.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Account disabled by an administrator.
    #[error("account disabled")]
    UserDisabled,

    /// Too many failed attempts; the provider is throttling.
    #[error("too many attempts, try again later")]
    TooManyAttempts,

    /// The operation needs a fresh sign-in.
    #[error("session expired, sign in again")]
    SessionExpired,

    /// No user is signed in.
    #[error("not signed in")]
    NotSignedIn,

    /// Provider returned an unrecognized error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Profile document could not be written.
    #[error("profile error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A signed-in account as the auth provider reports it.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Provider uid.
    pub uid: UserId,
    /// Sign-in email.
    pub email: String,
    /// Display name, if set.
    pub display_name: Option<String>,
    /// Short-lived token presented to the document store.
    pub id_token: SecretString,
}

/// An email/password auth provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and sign it in.
    async fn sign_up(&self, email: &Email, password: &str) -> Result<AuthUser, AuthError>;

    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Set the account's display name.
    async fn update_display_name(&self, user: &AuthUser, name: &str) -> Result<(), AuthError>;

    /// Replace the account's password. Providers require a recent sign-in,
    /// so callers re-authenticate first.
    async fn update_password(&self, user: &AuthUser, password: &str)
    -> Result<AuthUser, AuthError>;
}
