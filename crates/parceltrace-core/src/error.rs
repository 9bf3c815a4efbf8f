// ── Core error types ──
//
// User-facing errors from parceltrace-core. Consumers never see raw
// HTTP status codes or JSON parse failures directly; the
// `From<parceltrace_api::Error>` impl translates transport-layer
// errors into domain-appropriate variants. No failure here is fatal to
// the host: every error is scoped to a single tracking id or a single
// poll cycle.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Service errors ───────────────────────────────────────────────
    #[error("Cannot reach tracking service: {reason}")]
    ServiceUnreachable { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Tracking API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Data errors ──────────────────────────────────────────────────
    /// The response body could not be decoded; the raw body is logged
    /// at the call site before this is raised.
    #[error("Malformed API response: {message}")]
    MalformedResponse { message: String },

    /// The API answered with neither a session token nor shipment
    /// data. The existing record is left untouched.
    #[error("Unexpected API response for {tracking_id}: neither session token nor shipment data")]
    UnrecognizedResponse { tracking_id: String },

    // ── Storage errors ───────────────────────────────────────────────
    #[error("Storage IO error: {0}")]
    StorageIo(#[from] std::io::Error),

    #[error("Persisted store could not be decoded: {0}")]
    StoreDecode(#[from] serde_json::Error),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if the failed operation should simply be retried
    /// on the next poll cycle.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnreachable { .. }
                | Self::Api { .. }
                | Self::MalformedResponse { .. }
                | Self::UnrecognizedResponse { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<parceltrace_api::Error> for CoreError {
    fn from(err: parceltrace_api::Error) -> Self {
        match err {
            parceltrace_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ServiceUnreachable {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            parceltrace_api::Error::ProbeTimeout { timeout_secs } => {
                CoreError::ServiceUnreachable {
                    reason: format!("status probe timed out after {timeout_secs}s"),
                }
            }
            parceltrace_api::Error::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "API key rejected by tracking service".into(),
            },
            parceltrace_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            parceltrace_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
            parceltrace_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
        }
    }
}
