//! The signed-in user.
//!
//! A [`Session`] owns the current [`AuthUser`] and publishes every change on
//! a watch channel. Screens that depend on the user hold a
//! [`SessionSubscription`]; dropping it unsubscribes.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::instrument;

use bozor_core::{PasswordChange, ProfileUpdate, Registration, UserId, UserProfile};

use super::{AuthError, AuthProvider, AuthUser};
use crate::db::UserRepository;
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::store::DocumentStore;

/// Holds the signed-in user and keeps the document store's token in step.
pub struct Session {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    current: watch::Sender<Option<AuthUser>>,
}

/// A live view of the session's user.
#[derive(Debug, Clone)]
pub struct SessionSubscription {
    rx: watch::Receiver<Option<AuthUser>>,
}

impl SessionSubscription {
    /// The user as of now.
    #[must_use]
    pub fn current(&self) -> Option<AuthUser> {
        self.rx.borrow().clone()
    }

    /// Wait for the next sign-in or sign-out. Returns `None` once the
    /// session is gone.
    pub async fn changed(&mut self) -> Option<Option<AuthUser>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl Session {
    /// A signed-out session.
    #[must_use]
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn DocumentStore>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            auth,
            store,
            current,
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current(&self) -> Option<AuthUser> {
        self.current.borrow().clone()
    }

    /// Uid of the signed-in user, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.current.borrow().as_ref().map(|u| u.uid.clone())
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` when nobody is signed in.
    pub fn require_user(&self) -> Result<AuthUser, AuthError> {
        self.current().ok_or(AuthError::NotSignedIn)
    }

    /// Subscribe to sign-in and sign-out.
    #[must_use]
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.current.subscribe(),
        }
    }

    async fn publish(&self, user: Option<AuthUser>) {
        self.store
            .authorize(user.as_ref().map(|u| u.id_token.clone()))
            .await;
        match &user {
            Some(u) => set_sentry_user(&u.uid, Some(&u.email)),
            None => clear_sentry_user(),
        }
        self.current.send_replace(user);
    }

    /// Create an account, write its profile and sign it in.
    ///
    /// # Errors
    ///
    /// Returns the provider's error (e.g. `UserAlreadyExists`), or
    /// `AuthError::Repository` if the profile cannot be written.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<AuthUser, AuthError> {
        let user = self
            .auth
            .sign_up(&registration.email, &registration.password)
            .await?;

        // Profile writes run as the new account.
        self.store.authorize(Some(user.id_token.clone())).await;
        match self.finish_registration(user, registration).await {
            Ok(user) => {
                tracing::info!(uid = %user.uid, "Registered");
                add_breadcrumb("auth", "Registered", None);
                self.publish(Some(user.clone())).await;
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Registration incomplete, restoring previous token");
                let previous = self.current.borrow().as_ref().map(|u| u.id_token.clone());
                self.store.authorize(previous).await;
                Err(e)
            }
        }
    }

    async fn finish_registration(
        &self,
        mut user: AuthUser,
        registration: Registration,
    ) -> Result<AuthUser, AuthError> {
        UserRepository::new(self.store.as_ref())
            .create_profile(&user.uid, registration.email.as_str(), &registration.display_name)
            .await?;

        if !registration.display_name.is_empty() {
            self.auth
                .update_display_name(&user, &registration.display_name)
                .await?;
            user.display_name = Some(registration.display_name);
        }
        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email or password.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let user = self.auth.sign_in(email, password).await?;
        add_breadcrumb("auth", "Signed in", None);
        self.publish(Some(user.clone())).await;
        Ok(user)
    }

    /// Sign out. Signing out while signed out is a no-op.
    pub async fn sign_out(&self) {
        if self.current.borrow().is_some() {
            add_breadcrumb("auth", "Signed out", None);
        }
        self.publish(None).await;
    }

    /// Change the password, re-authenticating with the current one first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` when nobody is signed in, or
    /// `AuthError::InvalidCredentials` when the current password is wrong.
    #[instrument(skip_all)]
    pub async fn change_password(&self, change: PasswordChange) -> Result<(), AuthError> {
        let user = self.require_user()?;
        let fresh = self.auth.sign_in(&user.email, &change.current).await?;
        let updated = self.auth.update_password(&fresh, &change.new).await?;
        tracing::info!(uid = %updated.uid, "Password changed");
        self.publish(Some(updated)).await;
        Ok(())
    }

    /// The signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` when nobody is signed in.
    pub async fn profile(&self) -> Result<Option<UserProfile>, AuthError> {
        let user = self.require_user()?;
        Ok(UserRepository::new(self.store.as_ref())
            .get_profile(&user.uid)
            .await?)
    }

    /// Update the signed-in user's profile; a new display name is also
    /// pushed to the auth provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` when nobody is signed in.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, AuthError> {
        let mut user = self.require_user()?;
        let profile = UserRepository::new(self.store.as_ref())
            .update_profile(&user.uid, &update)
            .await?;

        if let Some(name) = update.display_name {
            self.auth.update_display_name(&user, &name).await?;
            user.display_name = Some(name);
            self.current.send_replace(Some(user));
        }
        Ok(profile)
    }
}
