use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::{error_from_response, join_url, read_json};
use crate::error::{ApiError, ApiResult, ErrorBody, LoginError};

const VERIFY_ACTION: &str = "verify";
const DEFAULT_LOGIN_FAILURE: &str = "invalid credentials";

/// Client for the endpoints reachable without a session.
///
/// Holds its own `reqwest::Client` and never attaches `x-access-token`, so a
/// stale session token cannot leak onto public endpoints.
#[derive(Clone)]
pub struct PublicClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl PublicClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Client(err.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, LoginError> {
        let response = self
            .http
            .post(join_url(&self.base_url, "/login"))
            .json(&Credentials { username, password })
            .send()
            .await
            .map_err(|err| LoginError::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body: LoginResponse = response
                .json()
                .await
                .map_err(|err| LoginError::Network(err.to_string()))?;
            return match body.token {
                Some(token) if !token.trim().is_empty() => {
                    info!("login accepted");
                    Ok(token)
                }
                _ => Err(LoginError::MissingToken),
            };
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        debug!(%status, "login rejected");
        Err(login_rejection(status, body))
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<MessageResponse> {
        self.post("/register", request).await
    }

    pub async fn verify(&self, username: &str, code: &str) -> ApiResult<MessageResponse> {
        self.post(
            "/verify",
            &serde_json::json!({ "username": username, "code": code }),
        )
        .await
    }

    pub async fn request_password_reset(&self, username: &str) -> ApiResult<MessageResponse> {
        self.post("/request-reset", &serde_json::json!({ "username": username }))
            .await
    }

    pub async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> ApiResult<MessageResponse> {
        self.post(
            "/reset-password",
            &serde_json::json!({ "token": reset_token, "new_password": new_password }),
        )
        .await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<MessageResponse> {
        let response = self
            .http
            .post(join_url(&self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|err| ApiError::Transport {
                path: path.to_string(),
                message: err.to_string(),
            })?;
        checked(response).await
    }
}

async fn checked(response: Response) -> ApiResult<MessageResponse> {
    if response.status().is_success() {
        read_json(response).await
    } else {
        Err(error_from_response(response).await)
    }
}

fn login_rejection(status: StatusCode, body: ErrorBody) -> LoginError {
    let message = body
        .message
        .unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string());
    if status == StatusCode::FORBIDDEN && body.action_required.as_deref() == Some(VERIFY_ACTION) {
        LoginError::VerificationRequired { message }
    } else {
        LoginError::Rejected { status, message }
    }
}
