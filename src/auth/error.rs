use anyhow::anyhow;
use serde::Deserialize;

use crate::error::FirebaseError;

/// Error payload returned by the Identity Toolkit API.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthApiError {
    pub(crate) error: AuthApiErrorInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthApiErrorInfo {
    pub message: String,
    pub code: u16,
}

impl AuthApiError {
    /// Whether the API is reporting that no account exists for the queried
    /// email address.
    pub(crate) fn is_user_not_found(&self) -> bool {
        matches!(
            self.error.message.as_str(),
            "USER_NOT_FOUND" | "EMAIL_NOT_FOUND"
        )
    }
}

impl From<AuthApiError> for FirebaseError {
    fn from(err: AuthApiError) -> Self {
        anyhow!(
            "Identity Toolkit API error {}: {}",
            err.error.code,
            err.error.message
        )
        .into()
    }
}
