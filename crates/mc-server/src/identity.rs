//! Identity provider boundary.
//!
//! The dashboard never stores credentials. Sign-up, password sign-in and
//! session lookup are delegated to an [`IdentityProvider`]; the hosted
//! implementation speaks the Supabase auth (GoTrue) REST API.

use async_trait::async_trait;
use mc_core::config::AuthConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The provider refused the request; the message is shown verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("authentication is not configured")]
    NotConfigured,

    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<(), IdentityError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError>;

    /// Resolve a stored access token. `Ok(None)` means the token is no longer
    /// valid.
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, IdentityError>;
}

// ---------------------------------------------------------------------------
// Disabled provider
// ---------------------------------------------------------------------------

/// Used when no provider is configured: every submission is refused and no
/// session ever resolves.
pub struct DisabledIdentity;

#[async_trait]
impl IdentityProvider for DisabledIdentity {
    async fn sign_up(&self, _: &str, _: &str, _: &str) -> Result<(), IdentityError> {
        Err(IdentityError::NotConfigured)
    }

    async fn sign_in_with_password(&self, _: &str, _: &str) -> Result<Session, IdentityError> {
        Err(IdentityError::NotConfigured)
    }

    async fn get_session(&self, _: &str) -> Result<Option<Session>, IdentityError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Supabase auth
// ---------------------------------------------------------------------------

pub struct SupabaseAuth {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    user: Option<UserResponse>,
}

#[derive(Deserialize)]
struct UserResponse {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Serialize)]
struct PasswordBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl SupabaseAuth {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    async fn rejected(resp: reqwest::Response) -> IdentityError {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        IdentityError::Rejected(error_message(status.as_u16(), &text))
    }
}

/// Pull the human-readable message out of a provider error body.
fn error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["msg", "error_description", "message", "error"] {
            if let Some(msg) = json.get(key).and_then(|v| v.as_str()) {
                if !msg.is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    format!("authentication request failed (HTTP {status})")
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<(), IdentityError> {
        let resp = self
            .client
            .post(self.url("signup"))
            .query(&[("redirect_to", redirect_to)])
            .header("apikey", &self.anon_key)
            .json(&PasswordBody { email, password })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }
        Ok(())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let resp = self
            .client
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&PasswordBody { email, password })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::rejected(resp).await);
        }
        let token: TokenResponse = resp.json().await?;
        let email = token
            .user
            .and_then(|u| u.email)
            .unwrap_or_else(|| email.to_string());
        Ok(Session {
            access_token: token.access_token,
            email,
        })
    }

    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, IdentityError> {
        let resp = self
            .client
            .get(self.url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::rejected(resp).await);
        }
        let user: UserResponse = resp.json().await?;
        Ok(Some(Session {
            access_token: access_token.to_string(),
            email: user.email.unwrap_or_default(),
        }))
    }
}

/// Pick the provider for `auth`: hosted when fully configured, otherwise
/// disabled.
pub fn from_config(
    auth: &AuthConfig,
    timeout: Duration,
) -> Result<std::sync::Arc<dyn IdentityProvider>, IdentityError> {
    match (&auth.provider_url, &auth.anon_key) {
        (Some(url), Some(key)) if auth.is_configured() => {
            Ok(std::sync::Arc::new(SupabaseAuth::new(url, key, timeout)?))
        }
        _ => {
            tracing::info!("no identity provider configured; sign-in is disabled");
            Ok(std::sync::Arc::new(DisabledIdentity))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
