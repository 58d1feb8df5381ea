use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Identity;
use crate::config::DecoderConfig;
use crate::error::{DecodeError, DecodeResult};

/// Reads identity claims out of a session token without verifying its signature.
///
/// The client holds no signing secret; the backend remains the authority on
/// whether a token is genuine. Decoding only establishes that the token is
/// structurally sound and that its claims match the portal's identity schema.
#[derive(Debug, Clone, Default)]
pub struct TokenDecoder {
    config: DecoderConfig,
}

impl TokenDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn decode(&self, token: &str) -> DecodeResult<Identity> {
        self.decode_at(token, Utc::now())
    }

    /// Decode against an explicit clock, used for expiry checks.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> DecodeResult<Identity> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DecodeError::Malformed("empty token".to_string()));
        }

        let token_data = decode::<Value>(token, &DecodingKey::from_secret(&[]), &claims_only())?;
        if !token_data.claims.is_object() {
            return Err(DecodeError::InvalidJson(
                "claim payload is not a JSON object".to_string(),
            ));
        }

        let identity = Identity::try_from(token_data.claims)?;
        if self.config.reject_expired && identity.is_expired_at(now, self.config.leeway_seconds) {
            if let Some(expires_at) = identity.expires_at {
                return Err(DecodeError::Expired(expires_at));
            }
        }

        debug!(user_id = identity.id, role = %identity.role, "decoded session token");
        Ok(identity)
    }
}

fn claims_only() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}
