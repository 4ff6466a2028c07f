//! In-memory auth provider for tests and offline demos.

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::Mutex;
use uuid::Uuid;

use bozor_core::model::user::MIN_PASSWORD_LENGTH;
use bozor_core::{Email, UserId};

use super::{AuthError, AuthProvider, AuthUser};

#[derive(Debug, Clone)]
struct Account {
    uid: UserId,
    password: String,
    display_name: Option<String>,
}

/// An [`AuthProvider`] keeping accounts in process memory.
#[derive(Debug, Default)]
pub struct InMemoryAuth {
    accounts: Mutex<HashMap<String, Account>>,
}

impl InMemoryAuth {
    /// An empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn session_for(email: &str, account: &Account) -> AuthUser {
        AuthUser {
            uid: account.uid.clone(),
            email: email.to_string(),
            display_name: account.display_name.clone(),
            id_token: SecretString::from(format!("mem-{}", Uuid::new_v4().simple())),
        }
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuth {
    async fn sign_up(&self, email: &Email, password: &str) -> Result<AuthUser, AuthError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "Password should be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email.as_str()) {
            return Err(AuthError::UserAlreadyExists);
        }
        let account = Account {
            uid: UserId::new(Uuid::new_v4().simple().to_string()),
            password: password.to_string(),
            display_name: None,
        };
        let user = Self::session_for(email.as_str(), &account);
        accounts.insert(email.as_str().to_string(), account);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = email.trim();
        let accounts = self.accounts.lock().await;
        match accounts.get(email) {
            Some(account) if account.password == password => Ok(Self::session_for(email, account)),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn update_display_name(&self, user: &AuthUser, name: &str) -> Result<(), AuthError> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .get_mut(&user.email)
            .ok_or(AuthError::SessionExpired)?;
        account.display_name = Some(name.to_string());
        Ok(())
    }

    async fn update_password(
        &self,
        user: &AuthUser,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "Password should be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .get_mut(&user.email)
            .ok_or(AuthError::SessionExpired)?;
        account.password = password.to_string();
        Ok(Self::session_for(&user.email, account))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let auth = InMemoryAuth::new();
        let email = Email::parse("seller@bozor.uz").unwrap();
        let created = auth.sign_up(&email, "secret1").await.unwrap();

        let signed_in = auth.sign_in("seller@bozor.uz", "secret1").await.unwrap();
        assert_eq!(created.uid, signed_in.uid);

        assert!(matches!(
            auth.sign_in("seller@bozor.uz", "wrong-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_up(&email, "secret2").await,
            Err(AuthError::UserAlreadyExists)
        ));
    }
}
