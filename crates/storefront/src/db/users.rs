//! User profile repository.

use chrono::Utc;
use tracing::instrument;

use bozor_core::{ProfileUpdate, UserId, UserProfile};

use super::{RepositoryError, USERS, from_document, to_fields, touch, update_existing};
use crate::store::DocumentStore;

/// Repository for user profiles.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Write the profile for a freshly registered account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    #[instrument(skip(self), fields(uid = %uid))]
    pub async fn create_profile(
        &self,
        uid: &UserId,
        email: &str,
        display_name: &str,
    ) -> Result<UserProfile, RepositoryError> {
        let now = Utc::now();
        let profile = UserProfile {
            id: uid.clone(),
            display_name: display_name.trim().to_string(),
            email: email.to_string(),
            phone: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.store
            .set(USERS, uid.as_str(), to_fields(&profile)?)
            .await?;
        Ok(profile)
    }

    /// Get a profile by uid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the read fails.
    /// Returns `RepositoryError::DataCorruption` if the document is unreadable.
    #[instrument(skip(self), fields(uid = %uid))]
    pub async fn get_profile(&self, uid: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        self.store
            .get(USERS, uid.as_str())
            .await?
            .map(|doc| from_document(USERS, doc))
            .transpose()
    }

    /// Apply a profile update and return the updated profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    #[instrument(skip(self, update), fields(uid = %uid))]
    pub async fn update_profile(
        &self,
        uid: &UserId,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, RepositoryError> {
        if !update.is_empty() {
            update_existing(self.store, USERS, uid.as_str(), touch(to_fields(update)?)).await?;
        }
        self.get_profile(uid)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("{USERS}/{uid}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_profile_lifecycle() {
        let store = InMemoryStore::new();
        let repo = UserRepository::new(&store);
        let uid = UserId::new("u1");

        repo.create_profile(&uid, "ali@bozor.uz", " Ali ").await.unwrap();
        let profile = repo.get_profile(&uid).await.unwrap().unwrap();
        assert_eq!(profile.id, uid);
        assert_eq!(profile.display_name, "Ali");

        let update = ProfileUpdate::new("Ali V.", "+998 90 123 45 67").unwrap();
        let updated = repo.update_profile(&uid, &update).await.unwrap();
        assert_eq!(updated.display_name, "Ali V.");
        assert_eq!(updated.phone.as_deref(), Some("+998 90 123 45 67"));
        assert_eq!(updated.email, "ali@bozor.uz");
    }

    #[tokio::test]
    async fn test_update_missing_profile() {
        let store = InMemoryStore::new();
        let repo = UserRepository::new(&store);
        let update = ProfileUpdate::new("Ali", "").unwrap();
        assert!(matches!(
            repo.update_profile(&UserId::new("ghost"), &update).await,
            Err(RepositoryError::NotFound(_))
        ));
    }
}
