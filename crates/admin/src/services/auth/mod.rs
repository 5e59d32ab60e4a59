//! Managed auth provider client.
//!
//! Password sign-in, sign-out, recovery email and password change over the
//! provider's REST API. Every request carries the public `apikey`; calls on
//! behalf of a signed-in user add their bearer token.
//!
//! # API Reference
//!
//! - `POST /auth/v1/token?grant_type=password` - sign in
//! - `POST /auth/v1/logout` - revoke the session
//! - `POST /auth/v1/recover` - send a recovery email
//! - `PUT /auth/v1/user` - change the password

mod error;

pub use error::AuthError;

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use endulque_core::OwnerId;

use crate::config::SupabaseConfig;
use crate::models::CurrentAdmin;

/// Shortest password accepted on change.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Serialize)]
struct RecoverBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PasswordUpdate<'a> {
    password: &'a str,
}

/// Check a new password before it is sent.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if it is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
    }
    Ok(())
}

/// Auth provider client.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    base_url: String,
    owner_id: OwnerId,
    reset_redirect: Option<String>,
}

impl AuthClient {
    /// Create a client for the provider at `config.url`. Only `owner_id` may
    /// sign in.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig, owner_id: OwnerId) -> Result<Self, AuthError> {
        let mut headers = HeaderMap::new();
        let mut apikey = HeaderValue::from_str(config.anon_key.expose_secret())
            .map_err(|e| AuthError::Config(format!("invalid anon key: {e}")))?;
        apikey.set_sensitive(true);
        headers.insert("apikey", apikey);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(AuthClientInner {
                client,
                base_url: config.url.clone(),
                owner_id,
                reset_redirect: config.password_reset_redirect_url.clone(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1{path}", self.inner.base_url)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a bad login and
    /// `AuthError::NotOwner` when the account is not the configured owner.
    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentAdmin, AuthError> {
        let response = self
            .inner
            .client
            .post(self.url("/token"))
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant {
                email: email.trim(),
                password,
            })
            .send()
            .await?;

        let status = response.status().as_u16();
        if status == 400 || status == 401 {
            return Err(AuthError::InvalidCredentials);
        }
        let token: TokenResponse = parse(response).await?;

        let user_id = OwnerId::new(token.user.id);
        if user_id != self.inner.owner_id {
            tracing::warn!(user_id = %user_id, "Sign-in by non-owner account refused");
            return Err(AuthError::NotOwner);
        }

        Ok(CurrentAdmin {
            user_id,
            email: token.user.email.unwrap_or_else(|| email.trim().to_string()),
            access_token: token.access_token,
        })
    }

    /// Revoke the provider session behind `access_token`.
    ///
    /// # Errors
    ///
    /// Returns the provider's error. An already expired token is not an
    /// error.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .inner
            .client
            .post(self.url("/logout"))
            .bearer_auth(access_token)
            .send()
            .await?;
        match check(response).await {
            Err(AuthError::Unauthorized) | Ok(()) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Ask the provider to email a recovery link.
    ///
    /// # Errors
    ///
    /// Returns the provider's error.
    #[tracing::instrument(skip(self))]
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let mut request = self
            .inner
            .client
            .post(self.url("/recover"))
            .json(&RecoverBody {
                email: email.trim(),
            });
        if let Some(redirect) = &self.inner.reset_redirect {
            request = request.query(&[("redirect_to", redirect.as_str())]);
        }
        check(request.send().await?).await
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` before any request, or
    /// `AuthError::Unauthorized` if the token is no longer valid.
    pub async fn update_password(
        &self,
        access_token: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        validate_password(password)?;
        let response = self
            .inner
            .client
            .put(self.url("/user"))
            .bearer_auth(access_token)
            .json(&PasswordUpdate { password })
            .send()
            .await?;
        check(response).await
    }
}

async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, AuthError> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    response
        .json()
        .await
        .map_err(|e| AuthError::Parse(format!("Failed to parse response: {e}")))
}

async fn check(response: reqwest::Response) -> Result<(), AuthError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(api_error(response).await)
}

async fn api_error(response: reqwest::Response) -> AuthError {
    let status = response.status().as_u16();
    if status == 401 || status == 403 {
        return AuthError::Unauthorized;
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    AuthError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(MIN_PASSWORD_LEN))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_upstream_classification() {
        assert!(!AuthError::InvalidCredentials.is_upstream());
        assert!(!AuthError::NotOwner.is_upstream());
        assert!(AuthError::Api {
            status: 500,
            message: String::new()
        }
        .is_upstream());
    }

    #[tokio::test]
    async fn test_weak_password_rejected_before_request() {
        let config = SupabaseConfig {
            url: "http://127.0.0.1:9".to_string(),
            anon_key: SecretString::from("anon".to_string()),
            service_role_key: SecretString::from("service".to_string()),
            password_reset_redirect_url: None,
        };
        let client = AuthClient::new(&config, OwnerId::new(Uuid::nil())).unwrap_or_else(|e| {
            panic!("client: {e}");
        });
        assert!(matches!(
            client.update_password("token", "abc").await,
            Err(AuthError::WeakPassword(_))
        ));
    }
}
