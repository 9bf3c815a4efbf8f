// ── Runtime tracker configuration ──
//
// Describes *how* to talk to the tracking service. Carries the API key
// and connection tuning, but never touches disk -- the config crate
// (or the host) constructs a `TrackerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Default service root for the Parcels App API.
pub const DEFAULT_ENDPOINT: &str = "https://parcelsapp.com";

/// Default seconds between poll cycles when using the built-in loop.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1800;

/// Configuration for a single tracker instance.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Service root; the tracking path is appended internally.
    pub endpoint: Url,
    /// URL probed for reachability at the start of each cycle.
    pub probe_url: Url,
    /// API key for the tracking service.
    pub api_key: SecretString,
    /// Destination country sent with every submission.
    pub destination_country: String,
    /// API language; truncated to a two-letter lowercase code.
    pub language: String,
    /// Transport timeout for tracking requests (the status probe has
    /// its own 10-second bound).
    pub timeout: Duration,
    /// Seconds between cycles for `run_poll_loop`.
    pub poll_interval_secs: u64,
}

impl TrackerConfig {
    /// Config with production endpoints and default tuning.
    pub fn new(api_key: SecretString, destination_country: impl Into<String>) -> Self {
        let endpoint: Url = DEFAULT_ENDPOINT
            .parse()
            .expect("default endpoint is a valid URL");

        Self {
            probe_url: endpoint.clone(),
            endpoint,
            api_key,
            destination_country: destination_country.into(),
            language: "en".into(),
            timeout: Duration::from_secs(30),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}
