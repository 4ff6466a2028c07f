//! Unified error handling with Sentry integration.
//!
//! Every page operation returns `Result<T, AppError>`. Screens turn an error
//! into a [`Notice`] with [`AppError::into_notice`], which captures
//! server-side failures to Sentry first.

use thiserror::Error;

use bozor_core::ValidationError;

use crate::auth::AuthError;
use crate::db::RepositoryError;
use crate::images::ImageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Form input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Image upload failed.
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not signed in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User may not do this (e.g. add a product without a shop).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A toast shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Short headline.
    pub title: String,
    /// Details.
    pub description: String,
    /// Whether this reports a failure.
    pub is_error: bool,
}

impl Notice {
    /// A success notice.
    #[must_use]
    pub fn success(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            is_error: false,
        }
    }

    fn failure(description: String) -> Self {
        Self {
            title: "Ошибка".to_string(),
            description,
            is_error: true,
        }
    }
}

impl AppError {
    fn is_server_side(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Repository(err) => matches!(
                err,
                RepositoryError::Store(_) | RepositoryError::DataCorruption(_)
            ),
            Self::Auth(AuthError::Repository(_) | AuthError::Http(_) | AuthError::Api { .. }) => true,
            _ => false,
        }
    }

    /// Generic Russian message for this kind of failure.
    fn summary(&self) -> &'static str {
        match self {
            Self::Repository(RepositoryError::Validation(_)) | Self::Validation(_) => {
                "Заполните все обязательные поля"
            }
            Self::Repository(RepositoryError::NotFound(_)) | Self::NotFound(_) => "Не найдено",
            Self::Repository(RepositoryError::Forbidden(_)) | Self::Forbidden(_) => {
                "Недостаточно прав"
            }
            Self::Repository(RepositoryError::Conflict(_)) => "Запись уже существует",
            Self::Repository(_) | Self::Internal(_) => "Не удалось выполнить операцию",
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Неверный email или пароль",
                AuthError::UserAlreadyExists => "Пользователь с таким email уже существует",
                AuthError::WeakPassword(_) | AuthError::Validation(_) => "Проверьте введённые данные",
                AuthError::NotSignedIn | AuthError::SessionExpired => "Войдите в аккаунт",
                AuthError::TooManyAttempts => "Слишком много попыток, попробуйте позже",
                _ => "Ошибка авторизации",
            },
            Self::Unauthorized(_) => "Войдите в аккаунт",
            Self::Image(_) => "Не удалось загрузить изображение",
        }
    }

    /// Turn the error into a user-facing notice: a generic message plus the
    /// underlying one. Server-side failures are captured to Sentry first.
    #[must_use]
    pub fn into_notice(self) -> Notice {
        if self.is_server_side() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        }
        Notice::failure(format!("{}: {self}", self.summary()))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Called on sign-in to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("favorites", "Added favorite", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
