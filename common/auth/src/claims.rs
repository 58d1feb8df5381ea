use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, DecodeResult};
use crate::roles::Role;

/// Typed identity claims read from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: i64,
    pub role: Role,
    pub sector: Option<String>,
    pub profile_incomplete: bool,
    pub profile_image: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Convenience helper for role checks.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| *role == self.role)
    }

    /// True when the identity belongs to the given sector.
    pub fn in_sector(&self, sector: &str) -> bool {
        self.sector.as_deref() == Some(sector)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_seconds: u32) -> bool {
        let leeway = chrono::Duration::seconds(i64::from(leeway_seconds));
        match self.expires_at {
            Some(expires_at) => expires_at
                .checked_add_signed(leeway)
                .is_some_and(|deadline| deadline < now),
            None => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClaimsRepr {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    sub: Option<serde_json::Value>,
    role: String,
    #[serde(default)]
    sector: Option<String>,
    profile_incomplete: bool,
    #[serde(default)]
    profile_image: Option<String>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
}

fn timestamp(name: &'static str, value: Option<i64>) -> DecodeResult<Option<DateTime<Utc>>> {
    match value {
        Some(seconds) => Utc
            .timestamp_opt(seconds, 0)
            .single()
            .map(Some)
            .ok_or_else(|| DecodeError::InvalidClaim(name, seconds.to_string())),
        None => Ok(None),
    }
}

/// `id` wins; otherwise an integer `sub`, as a number or a digit string.
fn subject_id(id: Option<i64>, sub: Option<serde_json::Value>) -> DecodeResult<i64> {
    if let Some(id) = id {
        return Ok(id);
    }
    match sub {
        Some(serde_json::Value::Number(number)) => number
            .as_i64()
            .ok_or_else(|| DecodeError::InvalidClaim("sub", number.to_string())),
        Some(serde_json::Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| DecodeError::InvalidClaim("sub", text)),
        Some(other) => Err(DecodeError::InvalidClaim("sub", other.to_string())),
        None => Err(DecodeError::InvalidClaim("id", "missing".to_string())),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|item| {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

impl TryFrom<ClaimsRepr> for Identity {
    type Error = DecodeError;

    fn try_from(value: ClaimsRepr) -> DecodeResult<Self> {
        let role = value
            .role
            .parse::<Role>()
            .map_err(|err| DecodeError::InvalidClaim("role", err.0))?;

        let id = subject_id(value.id, value.sub)?;

        Ok(Self {
            id,
            role,
            sector: non_blank(value.sector),
            profile_incomplete: value.profile_incomplete,
            profile_image: non_blank(value.profile_image),
            issued_at: timestamp("iat", value.iat)?,
            expires_at: timestamp("exp", value.exp)?,
        })
    }
}

impl TryFrom<serde_json::Value> for Identity {
    type Error = DecodeError;

    fn try_from(value: serde_json::Value) -> DecodeResult<Self> {
        let repr: ClaimsRepr = serde_json::from_value(value)
            .map_err(|err| DecodeError::InvalidJson(err.to_string()))?;
        Identity::try_from(repr)
    }
}
