use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub api_url: String,
    pub token_dir: PathBuf,
    pub request_timeout: Duration,
    pub token_leeway_seconds: u32,
}

impl PortalConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token_dir: PathBuf::from(".portal"),
            request_timeout: Duration::from_secs(30),
            token_leeway_seconds: 30,
        }
    }
}

pub fn load_portal_config() -> Result<PortalConfig> {
    let api_url = env::var("PORTAL_API_URL").context("PORTAL_API_URL must be set")?;
    let api_url = normalize_base_url(&api_url).context("Failed to parse PORTAL_API_URL")?;

    let token_dir = env::var("PORTAL_TOKEN_DIR")
        .ok()
        .and_then(|value| normalize_optional(&value))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".portal"));

    let request_timeout = env::var("PORTAL_REQUEST_TIMEOUT_SECS")
        .ok()
        .map(|value| parse_seconds(&value))
        .transpose()
        .context("Failed to parse PORTAL_REQUEST_TIMEOUT_SECS")?
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(30));

    let token_leeway_seconds = env::var("PORTAL_TOKEN_LEEWAY_SECS")
        .ok()
        .map(|value| parse_seconds(&value))
        .transpose()
        .context("Failed to parse PORTAL_TOKEN_LEEWAY_SECS")?
        .map(|seconds| u32::try_from(seconds).unwrap_or(u32::MAX))
        .unwrap_or(30);

    Ok(PortalConfig {
        api_url,
        token_dir,
        request_timeout,
        token_leeway_seconds,
    })
}

fn normalize_base_url(value: &str) -> Result<String> {
    let trimmed = value.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|err| anyhow!("Invalid URL '{trimmed}': {err}"))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(anyhow!("Unsupported URL scheme '{other}'. Use http or https.")),
    }
}

fn parse_seconds(value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|err| anyhow!("Invalid number of seconds '{}': {err}", value.trim()))
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
