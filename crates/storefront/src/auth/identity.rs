//! REST client for the hosted identity toolkit.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bozor_core::{Email, UserId};

use super::{AuthError, AuthProvider, AuthUser};
use crate::config::FirebaseConfig;

/// Identity toolkit client for email/password accounts.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl IdentityClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bozor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.identity_base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn call<B: Serialize + Sync, R: DeserializeOwned + Send>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R, AuthError> {
        let url = format!("{}/accounts:{endpoint}", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            tracing::warn!(status = status.as_u16(), %code, endpoint, "Auth request rejected");
            return Err(map_error_code(status.as_u16(), &code));
        }

        response.json().await.map_err(|e| AuthError::Api {
            status: status.as_u16(),
            message: format!("unreadable response: {e}"),
        })
    }
}

/// Map a provider error code (e.g. `EMAIL_EXISTS`, or
/// `WEAK_PASSWORD : Password should be at least 6 characters`) to an error.
fn map_error_code(status: u16, code: &str) -> AuthError {
    let (kind, detail) = code
        .split_once(" : ")
        .map_or((code.trim(), ""), |(k, d)| (k.trim(), d.trim()));
    match kind {
        "EMAIL_EXISTS" => AuthError::UserAlreadyExists,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" => {
            AuthError::InvalidCredentials
        }
        "WEAK_PASSWORD" => AuthError::WeakPassword(if detail.is_empty() {
            "password is too weak".to_string()
        } else {
            detail.to_string()
        }),
        "USER_DISABLED" => AuthError::UserDisabled,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
        "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "USER_NOT_FOUND" => {
            AuthError::SessionExpired
        }
        _ => AuthError::Api {
            status,
            message: code.to_string(),
        },
    }
}

fn into_user(account: AccountResponse, fallback_token: Option<&SecretString>) -> Result<AuthUser, AuthError> {
    let id_token = match (account.id_token, fallback_token) {
        (Some(token), _) => SecretString::from(token),
        (None, Some(token)) => token.clone(),
        (None, None) => {
            return Err(AuthError::Api {
                status: 200,
                message: "response carried no ID token".to_string(),
            });
        }
    };
    Ok(AuthUser {
        uid: UserId::new(account.local_id),
        email: account.email,
        display_name: account.display_name.filter(|n| !n.is_empty()),
        id_token,
    })
}

#[async_trait]
impl AuthProvider for IdentityClient {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &Email, password: &str) -> Result<AuthUser, AuthError> {
        let body = CredentialsRequest {
            email: email.as_str(),
            password,
            return_secure_token: true,
        };
        let account: AccountResponse = self.call("signUp", &body).await?;
        tracing::info!(uid = %account.local_id, "Account created");
        into_user(account, None)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let body = CredentialsRequest {
            email: email.trim(),
            password,
            return_secure_token: true,
        };
        let account: AccountResponse = self.call("signInWithPassword", &body).await?;
        into_user(account, None)
    }

    #[instrument(skip(self, user), fields(uid = %user.uid))]
    async fn update_display_name(&self, user: &AuthUser, name: &str) -> Result<(), AuthError> {
        let body = UpdateRequest {
            id_token: user.id_token.expose_secret(),
            display_name: Some(name),
            password: None,
            return_secure_token: false,
        };
        let _: AccountResponse = self.call("update", &body).await?;
        Ok(())
    }

    #[instrument(skip(self, user, password), fields(uid = %user.uid))]
    async fn update_password(
        &self,
        user: &AuthUser,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let body = UpdateRequest {
            id_token: user.id_token.expose_secret(),
            display_name: None,
            password: Some(password),
            return_secure_token: true,
        };
        let account: AccountResponse = self.call("update", &body).await?;
        into_user(account, Some(&user.id_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_error_codes() {
        assert!(matches!(
            map_error_code(400, "EMAIL_EXISTS"),
            AuthError::UserAlreadyExists
        ));
        assert!(matches!(
            map_error_code(400, "INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            map_error_code(400, "CREDENTIAL_TOO_OLD_LOGIN_AGAIN"),
            AuthError::SessionExpired
        ));
        assert!(matches!(
            map_error_code(400, "QUOTA_EXCEEDED"),
            AuthError::Api { status: 400, .. }
        ));
    }

    #[test]
    fn test_weak_password_keeps_provider_detail() {
        match map_error_code(400, "WEAK_PASSWORD : Password should be at least 6 characters") {
            AuthError::WeakPassword(detail) => {
                assert_eq!(detail, "Password should be at least 6 characters");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_account_without_token_uses_fallback() {
        let account = AccountResponse {
            local_id: "uid-1".to_string(),
            email: "a@b.uz".to_string(),
            display_name: Some(String::new()),
            id_token: None,
        };
        let token = SecretString::from("token");
        let user = into_user(account, Some(&token)).ok();
        assert_eq!(user.as_ref().map(|u| u.uid.as_str()), Some("uid-1"));
        assert!(user.and_then(|u| u.display_name).is_none());
    }
}
