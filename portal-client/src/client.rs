use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::interceptor::{InterceptorHandle, ResponseEvent, ResponseInterceptor};

/// Header carrying the session token on authenticated requests.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// The process-wide authenticated request client.
///
/// Clones share one token slot and one interceptor list. The token is read
/// when a request is dispatched, so `configure` affects later requests only.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
    interceptors: RwLock<Vec<(u64, Arc<dyn ResponseInterceptor>)>>,
    next_interceptor_id: AtomicU64,
}

impl ClientInner {
    pub(crate) fn remove_interceptor(&self, id: u64) {
        let mut guard = self.interceptors.write().expect("rwlock poisoned");
        guard.retain(|(registered, _)| *registered != id);
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Client(err.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: base_url.into().trim_end_matches('/').to_string(),
                token: RwLock::new(None),
                interceptors: RwLock::new(Vec::new()),
                next_interceptor_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Set or clear the token attached to every subsequent request.
    pub fn configure(&self, token: Option<&str>) {
        let mut guard = self.inner.token.write().expect("rwlock poisoned");
        *guard = token.map(str::to_owned);
        debug!(configured = guard.is_some(), "authenticated client reconfigured");
    }

    pub fn token(&self) -> Option<String> {
        let guard = self.inner.token.read().expect("rwlock poisoned");
        guard.clone()
    }

    pub fn register_interceptor(&self, interceptor: Arc<dyn ResponseInterceptor>) -> InterceptorHandle {
        let id = self.inner.next_interceptor_id.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.inner.interceptors.write().expect("rwlock poisoned");
        guard.push((id, interceptor));
        InterceptorHandle::new(&self.inner, id)
    }

    pub fn interceptor_count(&self) -> usize {
        let guard = self.inner.interceptors.read().expect("rwlock poisoned");
        guard.len()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        read_json(response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, Some(body)).await?;
        read_json(response).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::PUT, path, Some(body)).await?;
        read_json(response).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Issue a request, notify interceptors, and turn non-2xx statuses into errors.
    pub async fn send<B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let token = self.token();
        let mut request = self
            .inner
            .http
            .request(method.clone(), join_url(&self.inner.base_url, path));
        if let Some(token) = token.as_deref() {
            request = request.header(ACCESS_TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let outcome = request.send().await;
        let status = match &outcome {
            Ok(response) => Some(response.status()),
            Err(err) => err.status(),
        };
        trace!(%method, path, ?status, authenticated = token.is_some(), "request completed");
        self.notify(&ResponseEvent {
            method: &method,
            path,
            status,
            token: token.as_deref(),
        });

        let response = outcome.map_err(|err| ApiError::Transport {
            path: path.to_string(),
            message: err.to_string(),
        })?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }

    fn notify(&self, event: &ResponseEvent<'_>) {
        let interceptors: Vec<Arc<dyn ResponseInterceptor>> = {
            let guard = self.inner.interceptors.read().expect("rwlock poisoned");
            guard.iter().map(|(_, interceptor)| interceptor.clone()).collect()
        };
        for interceptor in interceptors {
            interceptor.on_response(event);
        }
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

pub(crate) async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let body = response
        .json::<ErrorBody>()
        .await
        .unwrap_or_default();
    ApiError::Status { status, body }
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl ResponseInterceptor for Noop {
        fn on_response(&self, _event: &ResponseEvent<'_>) {}
    }

    #[test]
    fn join_url_handles_leading_slash() {
        assert_eq!(join_url("http://host", "/login"), "http://host/login");
        assert_eq!(join_url("http://host", "login"), "http://host/login");
    }

    #[test]
    fn clones_share_token_slot() {
        let client = ApiClient::with_client(Client::new(), "http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");

        let other = client.clone();
        client.configure(Some("abc"));
        assert_eq!(other.token().as_deref(), Some("abc"));
        other.configure(None);
        assert_eq!(client.token(), None);
    }

    #[test]
    fn dropping_handle_deregisters() {
        let client = ApiClient::with_client(Client::new(), "http://localhost");
        let first = client.register_interceptor(Arc::new(Noop));
        let second = client.register_interceptor(Arc::new(Noop));
        assert_ne!(first.id(), second.id());
        assert_eq!(client.interceptor_count(), 2);

        first.deregister();
        assert_eq!(client.interceptor_count(), 1);
        drop(second);
        assert_eq!(client.interceptor_count(), 0);
    }

    #[test]
    fn handle_outliving_client_is_harmless() {
        let client = ApiClient::with_client(Client::new(), "http://localhost");
        let handle = client.register_interceptor(Arc::new(Noop));
        drop(client);
        drop(handle);
    }
}
