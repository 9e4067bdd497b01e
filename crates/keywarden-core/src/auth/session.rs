//! Vault session management.
//!
//! A session is a bearer token plus its absolute expiry instant, persisted
//! across restarts through a `TokenStorage`. The two values are always set
//! and cleared together. Whether the session counts as authenticated is
//! derived lazily from the wall clock on every read; expiry never mutates
//! stored state (only `logout` does).

use std::future::Future;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, warn};

use super::storage::{TokenStorage, EXPIRES_AT_KEY, TOKEN_KEY};

/// Token grant returned by the authentication endpoint.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// The authentication collaborator: exchanges the master password for a
/// token grant. Implemented by `ApiClient`; tests substitute stubs.
pub trait Authenticator {
    fn authenticate(&self, password: &str) -> impl Future<Output = Result<AuthGrant>>;
}

/// Holds the current session and its persistence.
///
/// Constructed once at startup; callers hold it for the process lifetime and
/// pass it wherever session state is consulted. Login and logout are the only
/// mutators besides `restore`. The store performs no internal locking -
/// overlapping `login` calls are the caller's to serialize.
pub struct SessionStore<S: TokenStorage> {
    storage: S,
    token: Option<String>,
    /// Epoch milliseconds after which the token is no longer valid.
    expires_at: Option<i64>,
}

impl<S: TokenStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            token: None,
            expires_at: None,
        }
    }

    /// Restore a persisted session, if any. Called once at startup.
    ///
    /// A missing key or an unparsable expiry leaves the session fully
    /// unauthenticated; a stale-but-wellformed pair is restored as-is and
    /// simply derives unauthenticated. Returns whether a pair was loaded.
    pub fn restore(&mut self) -> bool {
        let token = self.storage.get(TOKEN_KEY);
        let expires_at = self
            .storage
            .get(EXPIRES_AT_KEY)
            .and_then(|raw| raw.parse::<i64>().ok());

        match (token, expires_at) {
            (Some(token), Some(expires_at)) => {
                self.token = Some(token);
                self.expires_at = Some(expires_at);
                debug!(expires_at, "Restored persisted session");
                true
            }
            _ => {
                self.token = None;
                self.expires_at = None;
                false
            }
        }
    }

    /// Whether the session is currently authenticated, against the wall clock.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now().timestamp_millis())
    }

    /// Pure form of `is_authenticated` with the clock injected.
    pub fn is_authenticated_at(&self, now_ms: i64) -> bool {
        match (&self.token, self.expires_at) {
            (Some(_), Some(expires_at)) => now_ms < expires_at,
            _ => false,
        }
    }

    /// The bearer token, if one is held (valid or not).
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The expiry instant in epoch milliseconds, if a token is held.
    pub fn expires_at(&self) -> Option<i64> {
        self.expires_at
    }

    /// Exchange the master password for a session.
    ///
    /// On success both fields are set and persisted and `true` is returned.
    /// Any failure - connectivity, rejected password, malformed response -
    /// returns `false` and leaves the session exactly as it was. Callers that
    /// need the failure reason should call the API client directly.
    pub async fn login<A: Authenticator>(&mut self, auth: &A, password: &str) -> bool {
        let grant = match auth.authenticate(password).await {
            Ok(grant) => grant,
            Err(err) => {
                debug!(error = %err, "Login failed");
                return false;
            }
        };

        let expires_at = Utc::now().timestamp_millis() + grant.expires_in * 1000;
        self.token = Some(grant.access_token.clone());
        self.expires_at = Some(expires_at);

        if let Err(err) = self.storage.set(TOKEN_KEY, &grant.access_token) {
            warn!(error = %err, "Failed to persist session token");
        }
        if let Err(err) = self.storage.set(EXPIRES_AT_KEY, &expires_at.to_string()) {
            warn!(error = %err, "Failed to persist session expiry");
        }

        debug!(expires_at, "Login succeeded");
        true
    }

    /// Clear the session unconditionally. Idempotent.
    pub fn logout(&mut self) {
        self.token = None;
        self.expires_at = None;
        if let Err(err) = self.storage.remove(TOKEN_KEY) {
            warn!(error = %err, "Failed to remove persisted token");
        }
        if let Err(err) = self.storage.remove(EXPIRES_AT_KEY) {
            warn!(error = %err, "Failed to remove persisted expiry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemoryStore;

    /// Authenticator that always grants the same token.
    struct GrantStub {
        expires_in: i64,
    }

    impl Authenticator for GrantStub {
        async fn authenticate(&self, _password: &str) -> Result<AuthGrant> {
            Ok(AuthGrant {
                access_token: "tok-123".to_string(),
                expires_in: self.expires_in,
            })
        }
    }

    /// Authenticator that always fails, like an unreachable server.
    struct FailStub;

    impl Authenticator for FailStub {
        async fn authenticate(&self, _password: &str) -> Result<AuthGrant> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn store_with(entries: &[(&str, &str)]) -> SessionStore<MemoryStore> {
        let mut storage = MemoryStore::new();
        for (key, value) in entries {
            storage.set(key, value).unwrap();
        }
        SessionStore::new(storage)
    }

    #[test]
    fn empty_session_is_unauthenticated() {
        let session = SessionStore::new(MemoryStore::new());
        assert!(!session.is_authenticated());
        assert!(!session.is_authenticated_at(0));
    }

    #[test]
    fn past_expiry_is_unauthenticated_even_with_token() {
        let mut session = store_with(&[(TOKEN_KEY, "abc"), (EXPIRES_AT_KEY, "1000")]);
        assert!(session.restore());
        assert!(!session.is_authenticated_at(1000));
        assert!(!session.is_authenticated_at(2000));
    }

    #[test]
    fn future_expiry_is_authenticated() {
        let mut session = store_with(&[(TOKEN_KEY, "abc"), (EXPIRES_AT_KEY, "5000")]);
        assert!(session.restore());
        assert!(session.is_authenticated_at(4999));
        assert_eq!(session.token(), Some("abc"));
    }

    #[test]
    fn restore_with_future_wallclock_expiry_authenticates() {
        let mut session = store_with(&[(TOKEN_KEY, "abc"), (EXPIRES_AT_KEY, "9999999999999")]);
        assert!(session.restore());
        assert!(session.is_authenticated());
    }

    #[test]
    fn restore_with_garbage_expiry_is_unauthenticated() {
        let mut session = store_with(&[(TOKEN_KEY, "abc"), (EXPIRES_AT_KEY, "not-a-number")]);
        assert!(!session.restore());
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(session.expires_at(), None);
    }

    #[test]
    fn restore_with_missing_token_is_unauthenticated() {
        let mut session = store_with(&[(EXPIRES_AT_KEY, "9999999999999")]);
        assert!(!session.restore());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn successful_login_sets_expiry_and_authenticates() {
        let mut session = SessionStore::new(MemoryStore::new());
        let before = Utc::now().timestamp_millis();

        assert!(session.login(&GrantStub { expires_in: 3600 }, "master").await);

        let after = Utc::now().timestamp_millis();
        let expires_at = session.expires_at().unwrap();
        assert!(expires_at >= before + 3_600_000);
        assert!(expires_at <= after + 3_600_000);
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok-123"));
    }

    #[tokio::test]
    async fn successful_login_persists_both_keys() {
        let mut session = SessionStore::new(MemoryStore::new());
        assert!(session.login(&GrantStub { expires_in: 60 }, "master").await);

        assert_eq!(session.storage.get(TOKEN_KEY).as_deref(), Some("tok-123"));
        let raw = session.storage.get(EXPIRES_AT_KEY).unwrap();
        assert_eq!(raw.parse::<i64>().unwrap(), session.expires_at().unwrap());
    }

    #[tokio::test]
    async fn failed_login_leaves_state_unchanged() {
        let mut session = store_with(&[(TOKEN_KEY, "old"), (EXPIRES_AT_KEY, "7777")]);
        session.restore();

        assert!(!session.login(&FailStub, "master").await);

        assert_eq!(session.token(), Some("old"));
        assert_eq!(session.expires_at(), Some(7777));
        assert_eq!(session.storage.get(TOKEN_KEY).as_deref(), Some("old"));
        assert_eq!(session.storage.get(EXPIRES_AT_KEY).as_deref(), Some("7777"));
    }

    #[tokio::test]
    async fn logout_clears_state_and_storage() {
        let mut session = SessionStore::new(MemoryStore::new());
        assert!(session.login(&GrantStub { expires_in: 3600 }, "master").await);

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(session.storage.get(TOKEN_KEY), None);
        assert_eq!(session.storage.get(EXPIRES_AT_KEY), None);

        // Second logout is a no-op
        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn expiry_does_not_clear_persisted_state() {
        let mut session = store_with(&[(TOKEN_KEY, "abc"), (EXPIRES_AT_KEY, "1000")]);
        session.restore();

        // Reading authenticated status past expiry leaves the stale pair in place
        assert!(!session.is_authenticated_at(2000));
        assert_eq!(session.storage.get(TOKEN_KEY).as_deref(), Some("abc"));
        assert_eq!(session.storage.get(EXPIRES_AT_KEY).as_deref(), Some("1000"));
    }
}
