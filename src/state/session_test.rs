use super::*;
use std::sync::Mutex;

// =========================================================================
// MockIdentity
// =========================================================================

struct MockIdentity {
    outcome: Result<User, &'static str>,
    sign_out_fails: bool,
    calls: Mutex<Vec<String>>,
    probe: Mutex<Option<watch::Receiver<SessionState>>>,
    seen_loading: Mutex<Vec<bool>>,
}

impl MockIdentity {
    fn accepting(user: User) -> Self {
        Self {
            outcome: Ok(user),
            sign_out_fails: false,
            calls: Mutex::new(Vec::new()),
            probe: Mutex::new(None),
            seen_loading: Mutex::new(Vec::new()),
        }
    }

    fn rejecting(code: &'static str) -> Self {
        Self { outcome: Err(code), ..Self::accepting(user("unused")) }
    }

    fn watch(&self, rx: watch::Receiver<SessionState>) {
        *self.probe.lock().unwrap() = Some(rx);
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
        if let Some(rx) = self.probe.lock().unwrap().as_ref() {
            self.seen_loading.lock().unwrap().push(rx.borrow().loading);
        }
    }

    fn respond(&self) -> Result<UserCredential, AuthError> {
        match &self.outcome {
            Ok(user) => Ok(UserCredential {
                user: user.clone(),
                id_token: "id-tok".into(),
                refresh_token: "refresh-tok".into(),
                expires_in: 3600,
            }),
            Err(code) => Err(AuthError::Rejected { code: (*code).to_string() }),
        }
    }
}

#[async_trait::async_trait]
impl IdentityClient for MockIdentity {
    async fn sign_in_with_password(&self, email: &str, _password: &str) -> Result<UserCredential, AuthError> {
        self.record(&format!("password:{email}"));
        self.respond()
    }

    async fn sign_in_with_popup(&self, provider: FederatedProvider) -> Result<UserCredential, AuthError> {
        self.record(&format!("popup:{}", provider.provider_id()));
        self.respond()
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.record("sign_out");
        if self.sign_out_fails { Err(AuthError::Request("network unreachable".into())) } else { Ok(()) }
    }
}

fn user(uid: &str) -> User {
    User {
        uid: uid.into(),
        email: Some(format!("{uid}@example.com")),
        display_name: None,
        photo_url: None,
        provider_id: "password".into(),
    }
}

// =========================================================================
// getters
// =========================================================================

#[test]
fn default_state_is_signed_out() {
    let store = SessionStore::new();
    assert!(!store.state().is_authenticated());
    assert!(store.state().current_user().is_none());
    assert!(!store.state().loading);
    assert!(store.state().error.is_none());
}

#[test]
fn set_user_assigns_and_publishes() {
    let mut store = SessionStore::new();
    let rx = store.subscribe();
    store.set_user(Some(user("neo")));
    assert!(store.state().is_authenticated());
    assert_eq!(store.state().current_user().map(|u| u.uid.as_str()), Some("neo"));
    assert_eq!(rx.borrow().user.as_ref().map(|u| u.uid.as_str()), Some("neo"));

    store.set_user(None);
    assert!(!store.state().is_authenticated());
}

// =========================================================================
// login_with_email
// =========================================================================

#[tokio::test]
async fn login_with_email_success_stores_user() {
    let mut store = SessionStore::new();
    store.state.error = Some("stale".into());
    let client = MockIdentity::accepting(user("neo"));

    let cred = store
        .login_with_email(&client, "neo@example.com", "redpill")
        .await
        .unwrap();

    assert_eq!(cred.user.uid, "neo");
    assert_eq!(cred.id_token, "id-tok");
    assert_eq!(store.state().user, Some(user("neo")));
    assert!(store.state().error.is_none());
    assert!(!store.state().loading);
    assert_eq!(*client.calls.lock().unwrap(), vec!["password:neo@example.com".to_string()]);
}

#[tokio::test]
async fn login_with_email_failure_keeps_prior_user_and_returns_error() {
    let mut store = SessionStore::new();
    store.set_user(Some(user("smith")));
    let client = MockIdentity::rejecting("INVALID_LOGIN_CREDENTIALS");

    let err = store
        .login_with_email(&client, "neo@example.com", "bluepill")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Rejected { ref code } if code == "INVALID_LOGIN_CREDENTIALS"));
    assert_eq!(store.state().user, Some(user("smith")));
    assert_eq!(store.state().error.as_deref(), Some("invalid email or password"));
    assert!(!store.state().loading);
}

#[tokio::test]
async fn login_publishes_loading_while_in_flight() {
    let mut store = SessionStore::new();
    let client = MockIdentity::accepting(user("neo"));
    client.watch(store.subscribe());
    let rx = store.subscribe();

    store
        .login_with_email(&client, "neo@example.com", "redpill")
        .await
        .unwrap();

    assert_eq!(*client.seen_loading.lock().unwrap(), vec![true]);
    assert!(!rx.borrow().loading);
    assert!(rx.borrow().is_authenticated());
}

// =========================================================================
// login_with_google
// =========================================================================

#[tokio::test]
async fn login_with_google_uses_popup_flow() {
    let mut store = SessionStore::new();
    let client = MockIdentity::accepting(user("trinity"));

    store.login_with_google(&client).await.unwrap();

    assert_eq!(*client.calls.lock().unwrap(), vec!["popup:google.com".to_string()]);
    assert_eq!(store.state().current_user().map(|u| u.uid.as_str()), Some("trinity"));
    assert!(!store.state().loading);
}

#[tokio::test]
async fn login_with_google_failure_records_error() {
    let mut store = SessionStore::new();
    let client = MockIdentity::rejecting("USER_DISABLED");

    assert!(store.login_with_google(&client).await.is_err());
    assert_eq!(store.state().error.as_deref(), Some("this account has been disabled"));
    assert!(store.state().user.is_none());
    assert!(!store.state().loading);
}

// =========================================================================
// logout
// =========================================================================

#[tokio::test]
async fn logout_clears_user() {
    let mut store = SessionStore::new();
    store.set_user(Some(user("neo")));
    let client = MockIdentity::accepting(user("neo"));

    store.logout(&client).await.unwrap();

    assert!(!store.state().is_authenticated());
    assert_eq!(*client.calls.lock().unwrap(), vec!["sign_out".to_string()]);
}

#[tokio::test]
async fn logout_failure_records_error_and_keeps_user() {
    let mut store = SessionStore::new();
    store.set_user(Some(user("neo")));
    let client = MockIdentity { sign_out_fails: true, ..MockIdentity::accepting(user("neo")) };

    let err = store.logout(&client).await.unwrap_err();

    assert!(matches!(err, AuthError::Request(_)));
    assert!(store.state().is_authenticated());
    assert_eq!(store.state().error.as_deref(), Some("identity request failed: network unreachable"));
}

#[tokio::test]
async fn logout_does_not_touch_loading() {
    let mut store = SessionStore::new();
    store.state.loading = true;
    let client = MockIdentity::accepting(user("neo"));

    store.logout(&client).await.unwrap();
    assert!(store.state().loading);
}

// =========================================================================
// clear_error
// =========================================================================

#[test]
fn clear_error_resets_any_error() {
    let mut store = SessionStore::new();
    store.clear_error();
    assert!(store.state().error.is_none());

    store.state.error = Some("boom".into());
    store.clear_error();
    assert!(store.state().error.is_none());
}
