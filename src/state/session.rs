//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware components to coordinate login
//! redirects and identity-dependent rendering. Identity failures are recorded
//! in `error` for display and also returned so the caller can react
//! (redirect, toast).

use tokio::sync::watch;

use super::{BusyGuard, BusyStore};
use crate::net::types::{AuthError, FederatedProvider, IdentityClient, User, UserCredential};

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

pub struct SessionStore {
    state: SessionState,
    tx: watch::Sender<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyStore for SessionStore {
    fn begin(&mut self) {
        self.state.loading = true;
        self.state.error = None;
    }

    fn end(&mut self) {
        self.state.loading = false;
    }

    fn publish(&self) {
        self.tx.send_replace(self.state.clone());
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::default());
        Self { state: SessionState::default(), tx }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Overwrite the user, typically from an auth-state-change event.
    pub fn set_user(&mut self, user: Option<User>) {
        self.state.user = user;
        self.publish();
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the identity client's error unchanged after recording its
    /// message. A previously signed-in user is left in place.
    pub async fn login_with_email(
        &mut self,
        client: &dyn IdentityClient,
        email: &str,
        password: &str,
    ) -> Result<UserCredential, AuthError> {
        let mut busy = BusyGuard::start(self);
        let result = client.sign_in_with_password(email, password).await;
        busy.settle_sign_in(result)
    }

    /// Sign in through the federated Google popup.
    ///
    /// # Errors
    ///
    /// Returns the identity client's error unchanged after recording its message.
    pub async fn login_with_google(&mut self, client: &dyn IdentityClient) -> Result<UserCredential, AuthError> {
        let mut busy = BusyGuard::start(self);
        let result = client.sign_in_with_popup(FederatedProvider::Google).await;
        busy.settle_sign_in(result)
    }

    /// Sign out and clear the user. Leaves `loading` untouched.
    ///
    /// # Errors
    ///
    /// Returns the identity client's error unchanged after recording its message.
    pub async fn logout(&mut self, client: &dyn IdentityClient) -> Result<(), AuthError> {
        match client.sign_out().await {
            Ok(()) => {
                self.state.user = None;
                self.publish();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-out failed");
                self.state.error = Some(e.to_string());
                self.publish();
                Err(e)
            }
        }
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
        self.publish();
    }

    fn settle_sign_in(&mut self, result: Result<UserCredential, AuthError>) -> Result<UserCredential, AuthError> {
        match result {
            Ok(credential) => {
                tracing::debug!(uid = %credential.user.uid, provider = %credential.user.provider_id, "signed in");
                self.state.user = Some(credential.user.clone());
                Ok(credential)
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-in failed");
                self.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
