use thiserror::Error;

/// Two-level failure taxonomy for model calls. `RateLimited` captures
/// quota-shaped faults (HTTP 429 / resource exhaustion); everything else,
/// including a missing credential, is `Other`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("model endpoint rate limited: {0}")]
    RateLimited(String),
    #[error("model call failed: {0}")]
    Other(String),
}

impl GatewayError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Classify a non-success HTTP response by status and body text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = format!("HTTP {status} - {body}");
        if status == 429 || quota_shaped(body) {
            Self::RateLimited(message)
        } else {
            Self::Other(message)
        }
    }

    /// Classify a transport-level failure by its message text; transport
    /// errors from this client never carry an HTTP status (non-success
    /// statuses are classified in `from_response`).
    pub fn from_transport(error: &reqwest::Error) -> Self {
        let message = error.to_string();
        if quota_shaped(&message) {
            Self::RateLimited(message)
        } else {
            Self::Other(message)
        }
    }
}

/// Quota markers observed in Gemini error payloads.
fn quota_shaped(text: &str) -> bool {
    text.contains("429")
        || text.contains("RESOURCE_EXHAUSTED")
        || text.to_ascii_lowercase().contains("quota")
}
