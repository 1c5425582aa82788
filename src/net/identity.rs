//! Identity Toolkit REST client.
//!
//! Thin HTTP wrapper for `accounts:signInWithPassword` and
//! `accounts:signInWithIdp`. Pure parsing in `parse_sign_in_response` and
//! `parse_error` for testability.
//!
//! TRADE-OFFS
//! ==========
//! The REST surface has no popup of its own. Federated sign-in delegates the
//! interactive part to an injected [`PopupFlow`] and only exchanges the
//! resulting IdP token here. Sign-out is purely local.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::watch;

use super::types::{AuthError, FederatedProvider, IdentityClient, User, UserCredential};

const PASSWORD_PROVIDER_ID: &str = "password";
const IDP_REQUEST_URI: &str = "http://localhost";

/// Interactive half of a federated sign-in (browser popup, device flow, ...).
#[async_trait::async_trait]
pub trait PopupFlow: Send + Sync {
    /// Run the interactive flow and return the provider's id token.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the user dismisses the flow or it fails.
    async fn authorize(&self, provider: FederatedProvider) -> Result<String, AuthError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct FirebaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    popup: Option<Arc<dyn PopupFlow>>,
    current: watch::Sender<Option<User>>,
}

impl FirebaseAuthClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let (current, _) = watch::channel(None);
        Self { http, base_url: base_url.into(), api_key: api_key.into(), popup: None, current }
    }

    /// Attach the interactive flow used by [`IdentityClient::sign_in_with_popup`].
    #[must_use]
    pub fn with_popup(mut self, popup: Arc<dyn PopupFlow>) -> Self {
        self.popup = Some(popup);
        self
    }

    /// The user from the most recent successful sign-in, if still signed in.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.current.borrow().clone()
    }

    /// Auth-state-change stream. Fires on every sign-in and sign-out.
    #[must_use]
    pub fn auth_state(&self) -> watch::Receiver<Option<User>> {
        self.current.subscribe()
    }

    async fn post_sign_in(
        &self,
        endpoint: &str,
        body: serde_json::Value,
        default_provider: &str,
    ) -> Result<UserCredential, AuthError> {
        let url = format!("{}/accounts:{endpoint}", self.base_url);
        tracing::debug!(%endpoint, "identity request");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(parse_error(status, &text));
        }

        let credential = parse_sign_in_response(&text, default_provider)?;
        self.current.send_replace(Some(credential.user.clone()));
        Ok(credential)
    }
}

#[async_trait::async_trait]
impl IdentityClient for FirebaseAuthClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<UserCredential, AuthError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        self.post_sign_in("signInWithPassword", body, PASSWORD_PROVIDER_ID).await
    }

    async fn sign_in_with_popup(&self, provider: FederatedProvider) -> Result<UserCredential, AuthError> {
        let Some(popup) = &self.popup else {
            return Err(AuthError::Unsupported(format!("no popup flow configured for {}", provider.provider_id())));
        };
        let id_token = popup.authorize(provider).await?;
        let body = serde_json::json!({
            "postBody": idp_post_body(&id_token, provider),
            "requestUri": IDP_REQUEST_URI,
            "returnIdpCredential": true,
            "returnSecureToken": true,
        });
        self.post_sign_in("signInWithIdp", body, provider.provider_id()).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.current.send_replace(None);
        Ok(())
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    provider_id: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

// =============================================================================
// PARSING
// =============================================================================

fn idp_post_body(id_token: &str, provider: FederatedProvider) -> String {
    format!("id_token={id_token}&providerId={}", provider.provider_id())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_sign_in_response(json: &str, default_provider: &str) -> Result<UserCredential, AuthError> {
    let api: SignInResponse = serde_json::from_str(json).map_err(|e| AuthError::Parse(e.to_string()))?;
    let expires_in = api
        .expires_in
        .parse::<u64>()
        .map_err(|_| AuthError::Parse(format!("invalid expiresIn: {}", api.expires_in)))?;

    Ok(UserCredential {
        user: User {
            uid: api.local_id,
            email: non_empty(api.email),
            display_name: non_empty(api.display_name),
            photo_url: non_empty(api.photo_url),
            provider_id: non_empty(api.provider_id).unwrap_or_else(|| default_provider.to_string()),
        },
        id_token: api.id_token,
        refresh_token: api.refresh_token,
        expires_in,
    })
}

/// Turn a non-success response into an error. Provider messages look like
/// `"INVALID_PASSWORD"` or `"TOO_MANY_ATTEMPTS_TRY_LATER : details"`.
fn parse_error(status: u16, body: &str) -> AuthError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => {
            let code = env
                .error
                .message
                .split(" : ")
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            AuthError::Rejected { code }
        }
        Err(_) => AuthError::Request(format!("status {status}: {body}")),
    }
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;
