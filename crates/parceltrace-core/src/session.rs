// ── Session-token lifecycle ──

use chrono::{DateTime, Duration, Utc};

/// Upstream keeps a pending lookup alive for half an hour; after that
/// the token answers with stale or empty payloads and the request has
/// to be submitted again.
pub const SESSION_TTL_MINUTES: i64 = 30;

/// What to do with a package's stored session before polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionDisposition {
    /// The stored token is still inside its validity window.
    Reuse { token: String },
    /// No token, or the token has aged out -- submit the tracking id
    /// again to obtain a fresh one.
    Refresh,
}

/// Decide whether a stored session token may still be polled.
///
/// A token at exactly the TTL boundary is still considered valid;
/// only a strictly older one forces a refresh. A token without an
/// issuance timestamp (or vice versa) cannot be trusted either way.
pub fn session_disposition(
    token: Option<&str>,
    issued_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> SessionDisposition {
    match (token, issued_at) {
        (Some(token), Some(issued)) if now - issued <= Duration::minutes(SESSION_TTL_MINUTES) => {
            SessionDisposition::Reuse {
                token: token.to_owned(),
            }
        }
        _ => SessionDisposition::Refresh,
    }
}
