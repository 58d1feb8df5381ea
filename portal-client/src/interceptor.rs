use std::sync::{Arc, Weak};

use reqwest::{Method, StatusCode};

use crate::client::ClientInner;

/// Outcome of one request issued through the [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone, Copy)]
pub struct ResponseEvent<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    /// `None` when the request never produced a response.
    pub status: Option<StatusCode>,
    /// Token the request was dispatched with.
    pub token: Option<&'a str>,
}

impl ResponseEvent<'_> {
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Observer of every response flowing through the authenticated client.
///
/// Interceptors run after the response headers arrive and before the caller
/// sees the result; they cannot alter the result.
pub trait ResponseInterceptor: Send + Sync {
    fn on_response(&self, event: &ResponseEvent<'_>);
}

/// Registration of an interceptor; dropping it removes the registration.
pub struct InterceptorHandle {
    client: Weak<ClientInner>,
    id: u64,
}

impl InterceptorHandle {
    pub(crate) fn new(client: &Arc<ClientInner>, id: u64) -> Self {
        Self {
            client: Arc::downgrade(client),
            id,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn deregister(self) {
        drop(self);
    }
}

impl Drop for InterceptorHandle {
    fn drop(&mut self) {
        if let Some(client) = self.client.upgrade() {
            client.remove_interceptor(self.id);
        }
    }
}
