//! Client for the identity directory: the Firebase Auth accounts of the
//! application, reached through the Identity Toolkit REST API with a
//! service-account access token.

use anyhow::Context;
use serde::Deserialize;

use crate::{credentials::ServiceAccount, error::FirebaseError};

use self::{error::AuthApiError, token::AccessTokenManager};

mod error;
mod token;

/// A Firebase Auth account, as far as the admin tools care about one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[serde(rename = "localId")]
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

pub struct FirebaseAuthClient {
    client: reqwest::Client,
    token_manager: AccessTokenManager,
    api_url: String,
}

impl FirebaseAuthClient {
    pub fn new(service_account: ServiceAccount) -> Result<Self, FirebaseError> {
        let client = reqwest::Client::builder()
            .https_only(true)
            .build()
            .context("Failed to create HTTP client")?;

        let api_url = format!(
            "https://identitytoolkit.googleapis.com/v1/projects/{}/accounts",
            service_account.project_id
        );
        let token_manager = AccessTokenManager::new(service_account, client.clone());

        Ok(Self {
            client,
            token_manager,
            api_url,
        })
    }

    fn url(&self, path: impl AsRef<str>) -> String {
        format!("{}:{}", self.api_url, path.as_ref())
    }

    /// Looks up the account registered with the given email address. Returns
    /// `None` when no such account exists; any other API failure is an error.
    pub async fn lookup_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AuthUser>, FirebaseError> {
        let access_token = self
            .token_manager
            .get_access_token()
            .await
            .context("Failed to authorize identity lookup")?;

        let body = serde_json::json!({ "email": [email] });

        let res = self
            .client
            .post(self.url("lookup"))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .context("Failed to query the identity directory")?;

        if res.status().is_success() {
            let found: LookupResponse =
                res.json().await.context("Failed to read response JSON")?;

            Ok(found.users.into_iter().flatten().next())
        } else {
            let api_error: AuthApiError =
                res.json().await.context("Failed to read response JSON")?;

            if api_error.is_user_not_found() {
                Ok(None)
            } else {
                Err(api_error.into())
            }
        }
    }
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Option<Vec<AuthUser>>,
}
