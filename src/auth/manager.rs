// src/auth/manager.rs

use std::sync::{Mutex, MutexGuard, PoisonError};

use storefront_api::{AuthResponse, UserProfile};

use super::forms::{Credentials, RegistrationForm};
use super::listeners::{Listeners, Subscription};
use super::service::AuthService;
use super::state::AuthState;
use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::storage::SessionStore;

/// What a commit leaves in storage: token and profile, or nothing
type Persisted = Option<(String, UserProfile)>;

#[derive(Default)]
struct Session {
    state: AuthState,
    /// Bumped each time a commit starts; the highest one decides the outcome
    epoch: u64,
    /// What the latest commit persists
    target: Persisted,
}

/// Single authority on who is signed in.
///
/// Starts in [`AuthState::Unknown`] until [`restore`](Self::restore) reads the
/// persisted session. `login` and `register` move to `Authenticated` on
/// success and force `Anonymous` on any failure; `logout` always lands on
/// `Anonymous`. Share it behind an `Arc`.
///
/// Every change goes through one commit path: the target is recorded under
/// the lock, written to storage outside it, then published. When commits
/// overlap, the one started last wins in memory and in storage alike, and
/// the in-memory state is only ever `Authenticated` for a session that was
/// fully written.
pub struct SessionManager {
    auth: AuthService,
    store: SessionStore,
    session: Mutex<Session>,
    listeners: Listeners,
}

impl SessionManager {
    /// The manager persists through the same store the client reads its
    /// bearer token from.
    pub fn new(client: ApiClient) -> Self {
        let store = client.session().clone();
        Self {
            auth: AuthService::new(client),
            store,
            session: Mutex::new(Session::default()),
            listeners: Listeners::default(),
        }
    }

    pub fn state(&self) -> AuthState {
        self.lock_session().state.clone()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.lock_session().state.user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock_session().state.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.lock_session().state.is_admin()
    }

    /// Registers `callback` to run after every state transition
    pub fn on_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Startup rehydration from the persisted session.
    ///
    /// Runs once: later calls, or calls after a login/logout has started,
    /// return the current state untouched. The cached token is trusted as-is,
    /// no network call is made (see [`revalidate`](Self::revalidate)).
    pub fn restore(&self) -> AuthState {
        {
            let session = self.lock_session();
            if !session.state.is_loading() || session.epoch != 0 {
                return session.state.clone();
            }
        }

        let persisted = self.store.read_session();
        let changed = {
            let mut session = self.lock_session();
            if !session.state.is_loading() || session.epoch != 0 {
                return session.state.clone();
            }
            let next = Self::state_for(persisted.as_ref());
            session.target = persisted;
            Self::swap_state(&mut session, next)
        };
        if let Some(next) = &changed {
            if let Some(user) = next.user() {
                tracing::info!(user_id = %user.id, "Session restored from storage");
            }
            self.listeners.notify(next);
        }
        self.state()
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile> {
        match self.auth.login(credentials).await {
            Ok(response) => self.establish(response),
            Err(e) => Err(self.reject(e)),
        }
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<UserProfile> {
        match self.auth.register(form).await {
            Ok(response) => self.establish(response),
            Err(e) => Err(self.reject(e)),
        }
    }

    /// Drops the session locally. No network call; cannot fail.
    pub fn logout(&self) {
        self.commit(None);
        tracing::info!("Logged out");
    }

    /// Opt-in server check of the current session.
    ///
    /// A 401/403 logs out. A success refreshes the cached profile. Any other
    /// failure is returned and leaves the session as it was. Either outcome
    /// only applies if the session checked is still the current one.
    pub async fn revalidate(&self) -> Result<AuthState> {
        let checked = self.lock_session().target.clone();
        let Some((token, user)) = checked else {
            return Ok(self.state());
        };

        match self.auth.fetch_user(user.id).await {
            Ok(fresh) => {
                let refreshed = (fresh.id == user.id).then(|| (token.clone(), fresh));
                if let Some(target) = refreshed {
                    self.commit_if_current(&token, Some(target));
                }
                Ok(self.state())
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!(status = ?e.status_code(), "Stored session rejected by backend");
                if self.commit_if_current(&token, None) {
                    tracing::info!("Logged out");
                }
                Ok(self.state())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session revalidation failed, keeping session");
                Err(e)
            }
        }
    }

    fn establish(&self, response: AuthResponse) -> Result<UserProfile> {
        let AuthResponse { token, user } = response;
        if self.commit(Some((token, user.clone()))) {
            tracing::info!(user_id = %user.id, "Authenticated");
            Ok(user)
        } else {
            tracing::debug!(user_id = %user.id, "Session replaced before sign-in completed");
            Err(ClientError::Superseded)
        }
    }

    /// Never leave a half session behind a failed attempt, in memory or on disk
    fn reject(&self, error: ClientError) -> ClientError {
        tracing::debug!(error = %error, "Authentication failed");
        self.commit(None);
        error
    }

    /// Persists `target` and publishes the matching state. Returns whether
    /// `target` is what ended up published.
    fn commit(&self, target: Persisted) -> bool {
        let epoch = Self::begin(&mut self.lock_session(), target.clone());
        self.complete(epoch, target)
    }

    /// Commits `target` only while the session holding `token` is still the
    /// latest one.
    fn commit_if_current(&self, token: &str, target: Persisted) -> bool {
        let epoch = {
            let mut session = self.lock_session();
            let current = session.target.as_ref().is_some_and(|(t, _)| t == token);
            if !current {
                return false;
            }
            Self::begin(&mut session, target.clone())
        };
        self.complete(epoch, target)
    }

    fn begin(session: &mut Session, target: Persisted) -> u64 {
        session.epoch += 1;
        session.target = target;
        session.epoch
    }

    /// Storage I/O runs without the lock so that a store or a subscriber may
    /// call back into the manager. A newer commit may have finished while our
    /// writes were still landing, so on conflict the newest target is written
    /// again before anything is published.
    fn complete(&self, own: u64, target: Persisted) -> bool {
        let mut epoch = own;
        let mut pending = target;
        loop {
            match &pending {
                Some((token, user)) => {
                    self.store.write_token(token);
                    self.store.write_user(user);
                }
                None => self.store.clear(),
            }

            let changed = {
                let mut session = self.lock_session();
                if session.epoch != epoch {
                    epoch = session.epoch;
                    pending = session.target.clone();
                    continue;
                }
                Self::swap_state(&mut session, Self::state_for(pending.as_ref()))
            };
            if let Some(next) = changed {
                self.listeners.notify(&next);
            }
            return epoch == own;
        }
    }

    fn state_for(persisted: Option<&(String, UserProfile)>) -> AuthState {
        match persisted {
            Some((_, user)) => AuthState::Authenticated(user.clone()),
            None => AuthState::Anonymous,
        }
    }

    /// Applies `next`, returning it when it differs from the current state
    fn swap_state(session: &mut Session, next: AuthState) -> Option<AuthState> {
        if session.state == next {
            return None;
        }
        tracing::debug!(
            from = session.state.label(),
            to = next.label(),
            "Session state change"
        );
        session.state = next.clone();
        Some(next)
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.lock_session().state.label())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, OnceLock, Weak};

    use crate::http::RawResponse;
    use crate::storage::{KeyValueStore, MemoryStore, StorageError};
    use crate::storage::session_store::{TOKEN_KEY, USER_KEY};
    use crate::testing::{FlakyStore, StubTransport, sample_user};
    use storefront_api::ApiEnvelope;

    fn manager_with(stub: &Arc<StubTransport>, store: SessionStore) -> SessionManager {
        SessionManager::new(ApiClient::new("http://shop.test", stub.clone(), store))
    }

    fn auth_ok(token: &str, role: &str) -> ApiEnvelope<AuthResponse> {
        ApiEnvelope::success(
            200,
            "Login successful",
            AuthResponse {
                token: token.to_string(),
                user: sample_user(role),
            },
        )
    }

    fn credentials() -> Credentials {
        Credentials::new("ada@example.com", "engine42")
    }

    fn registration() -> RegistrationForm {
        RegistrationForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password: "engine42".to_string(),
            confirm_password: "engine42".to_string(),
        }
    }

    #[test]
    fn starts_unknown() {
        let manager = manager_with(&StubTransport::new(), SessionStore::in_memory());
        assert_eq!(manager.state(), AuthState::Unknown);
    }

    #[test]
    fn restore_with_persisted_session_is_authenticated_without_network() {
        let stub = StubTransport::new();
        let store = SessionStore::in_memory();
        store.write_token("persisted");
        store.write_user(&sample_user("USER"));

        let manager = manager_with(&stub, store);
        assert_eq!(
            manager.restore(),
            AuthState::Authenticated(sample_user("USER"))
        );
        assert!(stub.requests().is_empty());
    }

    #[test]
    fn restore_with_half_session_is_anonymous() {
        let store = SessionStore::in_memory();
        store.write_token("orphan");
        let manager = manager_with(&StubTransport::new(), store);
        assert_eq!(manager.restore(), AuthState::Anonymous);
    }

    #[test]
    fn restore_runs_once() {
        let store = SessionStore::in_memory();
        let manager = manager_with(&StubTransport::new(), store.clone());
        assert_eq!(manager.restore(), AuthState::Anonymous);

        store.write_token("late");
        store.write_user(&sample_user("USER"));
        assert_eq!(manager.restore(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn login_success_persists_token_and_user() {
        let stub = StubTransport::new();
        stub.push_json(200, &auth_ok("tok-1", "USER"));
        let store = SessionStore::in_memory();
        let manager = manager_with(&stub, store.clone());
        manager.restore();

        let user = manager.login(&credentials()).await.unwrap();

        assert_eq!(user, sample_user("USER"));
        assert!(manager.is_authenticated());
        assert_eq!(store.read_token().as_deref(), Some("tok-1"));
        assert_eq!(store.read_user(), Some(sample_user("USER")));
    }

    #[tokio::test]
    async fn login_rejected_with_401_stays_anonymous_and_persists_nothing() {
        let stub = StubTransport::new();
        stub.push(Ok(RawResponse::new(401, "")));
        let store = SessionStore::in_memory();
        let manager = manager_with(&stub, store.clone());
        manager.restore();

        let err = manager.login(&credentials()).await.unwrap_err();

        assert_eq!(err.status_code(), Some(401));
        assert_eq!(manager.state(), AuthState::Anonymous);
        assert_eq!(store.read_token(), None);
        assert_eq!(store.read_user(), None);
    }

    #[tokio::test]
    async fn login_logical_failure_from_unknown_forces_anonymous() {
        let stub = StubTransport::new();
        stub.push_json(200, &ApiEnvelope::<()>::failure(200, "Bad credentials"));
        let store = SessionStore::in_memory();
        let manager = manager_with(&stub, store.clone());

        let err = manager.login(&credentials()).await.unwrap_err();

        assert!(matches!(err, ClientError::Logical { .. }));
        assert_eq!(manager.state(), AuthState::Anonymous);
        assert_eq!(store.read_token(), None);
    }

    #[tokio::test]
    async fn failed_relogin_drops_previous_session() {
        let stub = StubTransport::new();
        stub.push_json(200, &auth_ok("tok-1", "USER"));
        stub.push(Ok(RawResponse::new(500, "")));
        let store = SessionStore::in_memory();
        let manager = manager_with(&stub, store.clone());

        manager.login(&credentials()).await.unwrap();
        assert!(manager.login(&credentials()).await.is_err());

        assert_eq!(manager.state(), AuthState::Anonymous);
        assert!(store.read_session().is_none());
    }

    #[tokio::test]
    async fn second_login_overwrites_session() {
        let stub = StubTransport::new();
        stub.push_json(200, &auth_ok("tok-user", "USER"));
        stub.push_json(200, &auth_ok("tok-admin", "ADMIN"));
        let store = SessionStore::in_memory();
        let manager = manager_with(&stub, store.clone());

        manager.login(&credentials()).await.unwrap();
        manager.login(&credentials()).await.unwrap();

        assert!(manager.is_admin());
        assert_eq!(store.read_token().as_deref(), Some("tok-admin"));
        // The second call carried the first token
        assert_eq!(
            stub.last_request().headers.get("authorization").unwrap(),
            "Bearer tok-user"
        );
    }

    #[tokio::test]
    async fn register_success_authenticates_and_strips_confirmation() {
        let stub = StubTransport::new();
        stub.push_json(201, &auth_ok("tok-new", "USER"));
        let store = SessionStore::in_memory();
        let manager = manager_with(&stub, store.clone());

        manager.register(&registration()).await.unwrap();

        assert!(manager.is_authenticated());
        assert_eq!(store.read_token().as_deref(), Some("tok-new"));
        assert!(stub.last_json().get("confirmPassword").is_none());
    }

    #[tokio::test]
    async fn register_conflict_is_anonymous() {
        let stub = StubTransport::new();
        stub.push(Ok(RawResponse::new(
            409,
            r#"{"success":false,"status":409,"message":"Email already exists","data":null}"#,
        )));
        let manager = manager_with(&stub, SessionStore::in_memory());

        let err = manager.register(&registration()).await.unwrap_err();
        assert_eq!(err.user_message(), "Email already exists");
        assert_eq!(manager.state(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn logout_clears_everything_and_is_idempotent() {
        let stub = StubTransport::new();
        stub.push_json(200, &auth_ok("tok-1", "USER"));
        let store = SessionStore::in_memory();
        let manager = manager_with(&stub, store.clone());
        manager.login(&credentials()).await.unwrap();

        manager.logout();
        let once = (manager.state(), store.read_token(), store.read_user());
        manager.logout();
        let twice = (manager.state(), store.read_token(), store.read_user());

        assert_eq!(once, (AuthState::Anonymous, None, None));
        assert_eq!(once, twice);
        assert_eq!(stub.requests().len(), 1);
    }

    #[tokio::test]
    async fn logout_survives_partial_storage_failure() {
        let stub = StubTransport::new();
        stub.push_json(200, &auth_ok("tok-1", "USER"));
        let flaky = Arc::new(FlakyStore::default());
        let manager = manager_with(&stub, SessionStore::new(flaky.clone()));
        manager.login(&credentials()).await.unwrap();

        flaky.fail_removal_of(USER_KEY);
        manager.logout();

        assert_eq!(manager.state(), AuthState::Anonymous);
        assert!(matches!(flaky.get(TOKEN_KEY), Ok(None)));
    }

    #[tokio::test]
    async fn subscribers_see_each_transition() {
        let stub = StubTransport::new();
        stub.push_json(200, &auth_ok("tok-1", "USER"));
        let manager = manager_with(&stub, SessionStore::in_memory());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscription = {
            let seen = seen.clone();
            manager.on_state_change(move |state| seen.lock().unwrap().push(state.label()))
        };

        manager.restore();
        manager.login(&credentials()).await.unwrap();
        manager.logout();
        manager.logout();
        subscription.unsubscribe();
        manager.restore();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["anonymous", "authenticated", "anonymous"]
        );
        assert_eq!(manager.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn revalidate_logs_out_on_401() {
        let stub = StubTransport::new();
        stub.push(Ok(RawResponse::new(401, "")));
        let store = SessionStore::in_memory();
        store.write_token("stale");
        store.write_user(&sample_user("USER"));
        let manager = manager_with(&stub, store.clone());
        manager.restore();

        assert_eq!(manager.revalidate().await.unwrap(), AuthState::Anonymous);
        assert!(store.read_session().is_none());
        assert_eq!(
            stub.last_request().url,
            format!("http://shop.test/api/users/{}", sample_user("USER").id)
        );
    }

    #[tokio::test]
    async fn revalidate_refreshes_profile_on_success() {
        let stub = StubTransport::new();
        let mut fresh = sample_user("ADMIN");
        fresh.name = "Ada King".to_string();
        stub.push_json(200, &ApiEnvelope::ok(fresh.clone()));
        let store = SessionStore::in_memory();
        store.write_token("tok");
        store.write_user(&sample_user("USER"));
        let manager = manager_with(&stub, store.clone());
        manager.restore();

        let state = manager.revalidate().await.unwrap();

        assert_eq!(state, AuthState::Authenticated(fresh.clone()));
        assert_eq!(store.read_user(), Some(fresh));
    }

    #[tokio::test]
    async fn revalidate_keeps_session_on_server_error() {
        let stub = StubTransport::new();
        stub.push(Ok(RawResponse::new(503, "")));
        let store = SessionStore::in_memory();
        store.write_token("tok");
        store.write_user(&sample_user("USER"));
        let manager = manager_with(&stub, store);
        manager.restore();

        assert!(manager.revalidate().await.is_err());
        assert!(manager.is_authenticated());
    }

    #[tokio::test]
    async fn revalidate_when_anonymous_makes_no_call() {
        let stub = StubTransport::new();
        let manager = manager_with(&stub, SessionStore::in_memory());
        manager.restore();

        assert_eq!(manager.revalidate().await.unwrap(), AuthState::Anonymous);
        assert!(stub.requests().is_empty());
    }

    /// Memory store that logs the manager out the first time the profile is
    /// written after being armed
    #[derive(Default)]
    struct LogoutOnUserWrite {
        inner: MemoryStore,
        manager: OnceLock<Weak<SessionManager>>,
        armed: AtomicBool,
    }

    impl LogoutOnUserWrite {
        fn arm(&self) {
            self.armed.store(true, Ordering::SeqCst);
        }
    }

    impl KeyValueStore for LogoutOnUserWrite {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
            if key == USER_KEY
                && self.armed.swap(false, Ordering::SeqCst)
                && let Some(manager) = self.manager.get().and_then(Weak::upgrade)
            {
                manager.logout();
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> std::result::Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    fn interrupted_manager(
        stub: &Arc<StubTransport>,
    ) -> (Arc<SessionManager>, Arc<LogoutOnUserWrite>, SessionStore) {
        let backend = Arc::new(LogoutOnUserWrite::default());
        let store = SessionStore::new(backend.clone());
        let manager = Arc::new(manager_with(stub, store.clone()));
        let _ = backend.manager.set(Arc::downgrade(&manager));
        (manager, backend, store)
    }

    fn assert_memory_matches_storage(manager: &SessionManager, store: &SessionStore) {
        match (manager.state(), store.read_session()) {
            (AuthState::Authenticated(user), Some((_, persisted))) => assert_eq!(user, persisted),
            (AuthState::Anonymous, None) => {}
            (state, persisted) => panic!("state {state:?} but storage holds {persisted:?}"),
        }
        if !manager.is_authenticated() {
            assert_eq!(store.read_token(), None);
            assert_eq!(store.read_user(), None);
        }
    }

    #[tokio::test]
    async fn logout_during_login_persistence_wins() {
        let stub = StubTransport::new();
        stub.push_json(200, &auth_ok("tok-1", "USER"));
        let (manager, backend, store) = interrupted_manager(&stub);
        manager.restore();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _subscription = {
            let seen = seen.clone();
            manager.on_state_change(move |state| seen.lock().unwrap().push(state.label()))
        };

        backend.arm();
        let err = manager.login(&credentials()).await.unwrap_err();

        assert!(matches!(err, ClientError::Superseded));
        assert_eq!(manager.state(), AuthState::Anonymous);
        assert_memory_matches_storage(&manager, &store);
        assert!(seen.lock().unwrap().iter().all(|label| *label != "authenticated"));
    }

    #[tokio::test]
    async fn logout_during_profile_refresh_is_not_undone() {
        let stub = StubTransport::new();
        let mut fresh = sample_user("USER");
        fresh.name = "Ada King".to_string();
        stub.push_json(200, &ApiEnvelope::ok(fresh));
        let (manager, backend, store) = interrupted_manager(&stub);
        store.write_token("tok");
        store.write_user(&sample_user("USER"));
        manager.restore();
        assert!(manager.is_authenticated());

        backend.arm();
        assert_eq!(manager.revalidate().await.unwrap(), AuthState::Anonymous);
        assert_memory_matches_storage(&manager, &store);
    }
}
