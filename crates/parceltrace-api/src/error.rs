use thiserror::Error;

/// Top-level error type for the `parceltrace-api` crate.
///
/// Covers every failure mode on the wire: transport, API-level
/// rejection, and response decoding. `parceltrace-core` maps these
/// into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The status probe exceeded its bounded timeout.
    #[error("Status probe timed out after {timeout_secs}s")]
    ProbeTimeout { timeout_secs: u64 },

    // ── API ─────────────────────────────────────────────────────────
    /// API key rejected by the tracking service.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Non-2xx response from the tracking API.
    #[error("Tracking API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on
    /// the next poll cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::ProbeTimeout { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the response body could not be decoded.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Deserialization { .. })
    }
}
