//! Collaborator types — identities, documents, queries, and errors.
//!
//! DESIGN
//! ======
//! Stores never talk to HTTP directly. They depend on the two async traits
//! below, which the REST clients in this module tree implement and tests
//! replace with in-memory mocks.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERRORS
// =============================================================================

/// Errors produced by identity provider operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider refused the request (bad credentials, disabled account, ...).
    #[error("{}", describe_auth_code(.code))]
    Rejected { code: String },

    /// The HTTP request to the provider failed.
    #[error("identity request failed: {0}")]
    Request(String),

    /// The provider response body could not be deserialized.
    #[error("identity response parse failed: {0}")]
    Parse(String),

    /// The client cannot perform this flow.
    #[error("unsupported sign-in flow: {0}")]
    Unsupported(String),
}

/// Map a provider error code to a human-readable message.
fn describe_auth_code(code: &str) -> String {
    let message = match code {
        "EMAIL_NOT_FOUND" => "no account exists for this email",
        "INVALID_PASSWORD" => "the password is invalid",
        "INVALID_LOGIN_CREDENTIALS" => "invalid email or password",
        "USER_DISABLED" => "this account has been disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "too many attempts, try again later",
        "INVALID_EMAIL" => "the email address is badly formatted",
        other => return format!("identity provider rejected request: {other}"),
    };
    message.to_string()
}

/// Errors produced by document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request to the document store failed.
    #[error("document request failed: {0}")]
    Request(String),

    /// The document store returned a non-success HTTP status.
    #[error("document store error (status {status}): {message}")]
    Response { status: u16, message: String },

    /// The response body could not be deserialized.
    #[error("document response parse failed: {0}")]
    Parse(String),
}

// =============================================================================
// IDENTITY
// =============================================================================

/// An authenticated identity as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    /// Provider that produced the sign-in (`"password"`, `"google.com"`, ...).
    pub provider_id: String,
}

/// Full result of a successful sign-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    pub user: User,
    pub id_token: String,
    pub refresh_token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Federated identity providers usable with the interactive popup flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FederatedProvider {
    Google,
}

impl FederatedProvider {
    /// Provider identifier understood by the identity service.
    #[must_use]
    pub fn provider_id(self) -> &'static str {
        match self {
            Self::Google => "google.com",
        }
    }
}

/// Identity service client. Enables mocking in tests.
#[async_trait::async_trait]
pub trait IdentityClient: Send + Sync {
    /// Sign in with an email/password credential.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the provider rejects the credential or the
    /// request fails.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<UserCredential, AuthError>;

    /// Sign in through an interactive federated popup.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the popup is dismissed, the provider rejects
    /// the token, or the flow is unavailable.
    async fn sign_in_with_popup(&self, provider: FederatedProvider) -> Result<UserCredential, AuthError>;

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the provider fails to sign out.
    async fn sign_out(&self) -> Result<(), AuthError>;
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// A stored document: backend-assigned id plus an arbitrary field map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A collection query with optional ordering and result cap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub collection: String,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub fn collection(collection: impl Into<String>) -> Self {
        Self { collection: collection.into(), order_by: None, limit: None }
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    #[must_use]
    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }
}

/// Document store client. Enables mocking in tests.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run a collection query.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the request fails or the response is malformed.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Fetch a single document; `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the request fails or the response is malformed.
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
