#![allow(dead_code)]

use std::time::Duration;

use chrono::Utc;
use common_auth::{MemoryTokenStore, TokenStore};
use httpmock::MockServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use portal_client::{ApiClient, PublicClient, SessionContext, SessionMetrics};
use serde_json::{json, Value};

/// Secret only the mock backend knows; the client never sees it.
const BACKEND_SECRET: &[u8] = b"intranet-backend-secret";

pub struct TokenFields<'a> {
    pub id: i64,
    pub role: &'a str,
    pub sector: Option<&'a str>,
    pub profile_incomplete: bool,
}

impl Default for TokenFields<'_> {
    fn default() -> Self {
        Self {
            id: 1,
            role: "VIEWER",
            sector: None,
            profile_incomplete: false,
        }
    }
}

pub fn claims(fields: &TokenFields<'_>) -> Value {
    let issued_at = Utc::now().timestamp();
    json!({
        "id": fields.id,
        "role": fields.role,
        "sector": fields.sector,
        "profile_incomplete": fields.profile_incomplete,
        "profile_image": null,
        "iat": issued_at,
        "exp": issued_at + 24 * 3600,
    })
}

pub fn sign(claims: &Value) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(BACKEND_SECRET),
    )
    .expect("sign token")
}

pub fn issue_token(fields: &TokenFields<'_>) -> String {
    sign(&claims(fields))
}

pub fn expired_token() -> String {
    let mut value = claims(&TokenFields::default());
    value["exp"] = json!(Utc::now().timestamp() - 3600);
    sign(&value)
}

pub struct Harness {
    pub server: MockServer,
    pub store: MemoryTokenStore,
    pub session: SessionContext,
    pub public: PublicClient,
    pub metrics: SessionMetrics,
}

impl Harness {
    pub fn start() -> Self {
        Self::with_store(MemoryTokenStore::new())
    }

    /// Seed the store before the session bootstraps from it.
    pub fn with_persisted(token: &str) -> Self {
        Self::with_store(MemoryTokenStore::with_token(token))
    }

    pub fn with_store(store: MemoryTokenStore) -> Self {
        let server = MockServer::start();
        let metrics = SessionMetrics::new().expect("metrics");
        let client = ApiClient::new(server.base_url(), Duration::from_secs(5)).expect("client");
        let public = PublicClient::new(server.base_url(), Duration::from_secs(5)).expect("public client");
        let session = SessionContext::builder(client)
            .with_store(store.clone())
            .with_metrics(metrics.clone())
            .bootstrap();

        Self {
            server,
            store,
            session,
            public,
            metrics,
        }
    }

    pub fn persisted(&self) -> Option<String> {
        self.store.read()
    }
}
