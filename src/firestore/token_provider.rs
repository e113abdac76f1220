use anyhow::Context;
use jsonwebtoken::{get_current_timestamp, Algorithm};
use serde::Serialize;

use crate::{credentials::ServiceAccount, error::FirebaseError};

/// Audience Firestore expects in self-signed service account JWTs.
const FIRESTORE_AUDIENCE: &str = "https://firestore.googleapis.com/";

/// Tokens are minted with a one hour lifetime.
const TOKEN_LIFETIME_SECS: u64 = 60 * 60;

/// A fresh token is minted this long before the current one actually expires.
const EXPIRY_BUFFER_SECS: u64 = 5 * 60;

/// Mints bearer tokens for the Firestore gRPC channel by signing a JWT with
/// the service account's private key. The current token is reused until it is
/// close to expiry.
#[derive(Clone)]
pub struct FirestoreTokenProvider {
    service_account: ServiceAccount,
    current_token: Option<Token>,
}

#[derive(Clone)]
struct Token {
    jwt: String,
    refresh_after: u64,
}

impl FirestoreTokenProvider {
    pub fn new(service_account: ServiceAccount) -> Self {
        Self {
            service_account,
            current_token: None,
        }
    }

    pub fn get_token(&mut self) -> Result<String, FirebaseError> {
        if let Some(token) = &self.current_token {
            if get_current_timestamp() < token.refresh_after {
                return Ok(token.jwt.clone());
            }
        }

        let token = sign_jwt(&self.service_account)?;
        let jwt = token.jwt.clone();
        self.current_token = Some(token);
        Ok(jwt)
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
    uid: &'a str,
}

fn sign_jwt(service_account: &ServiceAccount) -> Result<Token, anyhow::Error> {
    let mut header = jsonwebtoken::Header::new(Algorithm::RS256);
    header.kid = Some(service_account.private_key_id.clone());

    let issued_at = get_current_timestamp();
    let claims = Claims {
        iss: &service_account.client_email,
        sub: &service_account.client_email,
        aud: FIRESTORE_AUDIENCE,
        iat: issued_at,
        exp: issued_at + TOKEN_LIFETIME_SECS,
        uid: &service_account.client_id,
    };

    let encoding_key =
        jsonwebtoken::EncodingKey::from_rsa_pem(service_account.private_key.as_ref())
            .context("Failed to create JWT encoding key from the given private key")?;

    let jwt =
        jsonwebtoken::encode(&header, &claims, &encoding_key).context("Failed to sign JWT")?;

    Ok(Token {
        jwt,
        refresh_after: claims.exp - EXPIRY_BUFFER_SECS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_service_account;

    #[test]
    fn reuses_token_until_close_to_expiry() {
        let mut provider = FirestoreTokenProvider::new(test_service_account());

        let initial_token = provider.get_token().unwrap();

        // We have to wait for at least a second or else a regenerated token
        // would be identical to the original one (same issued-at time).
        std::thread::sleep(std::time::Duration::from_secs(1));

        // Some time passes, but the token is still comfortably valid.
        provider.current_token.as_mut().unwrap().refresh_after -= 40 * 60;
        let reused = provider.get_token().unwrap();
        assert_eq!(initial_token, reused);

        // Enough time passes to cross the refresh threshold.
        provider.current_token.as_mut().unwrap().refresh_after -= 20 * 60;
        let fresh = provider.get_token().unwrap();
        assert_ne!(initial_token, fresh);
    }
}
