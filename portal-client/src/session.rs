use std::sync::{Arc, Mutex, RwLock, Weak};

use common_auth::{Identity, MemoryTokenStore, TokenDecoder, TokenStore};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::error::SessionError;
use crate::interceptor::{InterceptorHandle, ResponseEvent, ResponseInterceptor};
use crate::metrics::SessionMetrics;
use crate::public::PublicClient;

pub const REFRESH_TOKEN_PATH: &str = "/login/refresh-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { token: String, identity: Identity },
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated { identity, .. } => Some(identity),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { token, .. } => Some(token),
            SessionState::Unauthenticated => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Teardown {
    Logout,
    Unauthorized,
}

impl Teardown {
    fn as_str(&self) -> &'static str {
        match self {
            Teardown::Logout => "logout",
            Teardown::Unauthorized => "unauthorized",
        }
    }
}

/// Owner of the {token, identity} pair and of the authenticated client's token.
///
/// Every transition persists, reconfigures the client and swaps the state
/// while holding the state lock, so readers never observe a token and
/// identity that disagree, and requests issued after a transition carry the
/// post-transition token.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<dyn TokenStore>,
    decoder: TokenDecoder,
    client: ApiClient,
    metrics: Option<SessionMetrics>,
    state: RwLock<SessionState>,
    interceptor: Mutex<Option<InterceptorHandle>>,
}

pub struct SessionContextBuilder {
    client: ApiClient,
    store: Arc<dyn TokenStore>,
    decoder: TokenDecoder,
    metrics: Option<SessionMetrics>,
}

impl SessionContextBuilder {
    fn new(client: ApiClient) -> Self {
        Self {
            client,
            store: Arc::new(MemoryTokenStore::new()),
            decoder: TokenDecoder::default(),
            metrics: None,
        }
    }

    pub fn with_store(mut self, store: impl TokenStore + 'static) -> Self {
        self.store = Arc::new(store);
        self
    }

    pub fn with_decoder(mut self, decoder: TokenDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_metrics(mut self, metrics: SessionMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build an Unauthenticated context without reading persisted storage.
    /// Any token a previous context left on the client is dropped.
    pub fn build(self) -> SessionContext {
        self.client.configure(None);
        let inner = Arc::new_cyclic(|weak: &Weak<SessionInner>| {
            let handle = self.client.register_interceptor(Arc::new(TeardownOnUnauthorized {
                session: weak.clone(),
            }));
            SessionInner {
                store: self.store,
                decoder: self.decoder,
                client: self.client,
                metrics: self.metrics,
                state: RwLock::new(SessionState::Unauthenticated),
                interceptor: Mutex::new(Some(handle)),
            }
        });
        SessionContext { inner }
    }

    /// Build the context and seed it from the persisted token, if any.
    pub fn bootstrap(self) -> SessionContext {
        let session = self.build();
        session.restore();
        session
    }
}

impl SessionContext {
    pub fn builder(client: ApiClient) -> SessionContextBuilder {
        SessionContextBuilder::new(client)
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    pub fn state(&self) -> SessionState {
        self.read_state().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.read_state().identity().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.read_state().token().map(str::to_owned)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.read_state(), SessionState::Authenticated { .. })
    }

    /// Adopt a freshly issued token. A token that cannot be decoded ends the
    /// session instead: nothing undecodable is ever kept.
    pub fn login(&self, token: &str) -> Result<Identity, SessionError> {
        let mut state = self.write_state();
        self.apply_token(&mut state, token, "login")
    }

    /// End the session and erase the persisted token, whether or not the
    /// token was ever adopted by this context.
    pub fn logout(&self) {
        let mut state = self.write_state();
        self.teardown(&mut state, Teardown::Logout);
    }

    /// Sign in through the public endpoint and adopt the returned token.
    pub async fn sign_in(
        &self,
        public: &PublicClient,
        username: &str,
        password: &str,
    ) -> Result<Identity, SessionError> {
        let token = public.login(username, password).await?;
        self.login(&token)
    }

    /// Exchange the current token for a freshly issued one, e.g. after the
    /// profile has been completed. The new identity is in place before this
    /// returns; if the session changed meanwhile the new token is dropped.
    pub async fn refresh(&self) -> Result<Identity, SessionError> {
        let current = self.token().ok_or(SessionError::NotAuthenticated)?;
        let response: TokenResponse = self
            .inner
            .client
            .post_json(REFRESH_TOKEN_PATH, &serde_json::json!({}))
            .await?;

        let mut state = self.write_state();
        if state.token() != Some(current.as_str()) {
            debug!("discarding refreshed token; session changed during refresh");
            return Err(SessionError::Superseded);
        }
        self.apply_token(&mut state, &response.token, "refresh")
    }

    /// Deregister the response interceptor. Dropping the last handle to the
    /// context has the same effect.
    pub fn shutdown(&self) {
        let handle = self
            .inner
            .interceptor
            .lock()
            .expect("mutex poisoned")
            .take();
        if handle.is_some() {
            debug!("session interceptor deregistered");
        }
    }

    fn restore(&self) {
        let Some(token) = self.inner.store.read() else {
            debug!("no persisted session token");
            return;
        };
        let mut state = self.write_state();
        if self.apply_token(&mut state, &token, "restore").is_err() {
            info!("persisted session token discarded");
        }
    }

    fn apply_token(
        &self,
        state: &mut SessionState,
        token: &str,
        event: &'static str,
    ) -> Result<Identity, SessionError> {
        match self.inner.decoder.decode(token) {
            Ok(identity) => {
                self.inner.store.save(token);
                self.inner.client.configure(Some(token));
                *state = SessionState::Authenticated {
                    token: token.to_owned(),
                    identity: identity.clone(),
                };
                self.record(event);
                info!(
                    event,
                    user_id = identity.id,
                    role = %identity.role,
                    profile_incomplete = identity.profile_incomplete,
                    "session established"
                );
                Ok(identity)
            }
            Err(err) => {
                warn!(event, error = %err, "session token could not be decoded");
                self.inner.store.clear();
                self.inner.client.configure(None);
                *state = SessionState::Unauthenticated;
                if let Some(metrics) = &self.inner.metrics {
                    metrics.decode_failure();
                }
                Err(SessionError::InvalidToken(err))
            }
        }
    }

    fn teardown(&self, state: &mut SessionState, reason: Teardown) -> bool {
        self.inner.store.clear();
        self.inner.client.configure(None);
        if matches!(state, SessionState::Unauthenticated) {
            debug!(reason = reason.as_str(), "no active session to close");
            return false;
        }
        *state = SessionState::Unauthenticated;
        self.record(reason.as_str());
        info!(reason = reason.as_str(), "session closed");
        true
    }

    fn record(&self, event: &str) {
        if let Some(metrics) = &self.inner.metrics {
            metrics.transition(event);
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.inner.state.read().expect("rwlock poisoned")
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.inner.state.write().expect("rwlock poisoned")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Closes the session when the backend answers 401 to a request that carried
/// the current token. Responses to requests dispatched under an older token,
/// or without one, leave the session alone.
struct TeardownOnUnauthorized {
    session: Weak<SessionInner>,
}

impl ResponseInterceptor for TeardownOnUnauthorized {
    fn on_response(&self, event: &ResponseEvent<'_>) {
        if !event.is_unauthorized() {
            return;
        }
        let Some(inner) = self.session.upgrade() else {
            return;
        };
        let session = SessionContext { inner };
        let mut state = session.write_state();
        let dispatched_with_current = matches!(
            (state.token(), event.token),
            (Some(current), Some(dispatched)) if current == dispatched
        );
        if dispatched_with_current {
            warn!(method = %event.method, path = event.path, "backend rejected session token");
            session.teardown(&mut state, Teardown::Unauthorized);
        } else {
            debug!(path = event.path, "ignoring 401 for a stale or anonymous request");
        }
    }
}
