/// Runtime configuration for client-side token decoding.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Allowable clock skew in seconds when checking exp.
    pub leeway_seconds: u32,
    /// Treat tokens past their exp claim as undecodable.
    pub reject_expired: bool,
}

impl DecoderConfig {
    /// Construct config with sensible defaults (30 second leeway, expired tokens rejected).
    pub fn new() -> Self {
        Self {
            leeway_seconds: 30,
            reject_expired: true,
        }
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    /// Keep expired tokens usable; the backend will answer 401 for them.
    pub fn accept_expired(mut self) -> Self {
        self.reject_expired = false;
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}
