// Hand-crafted async HTTP client for the Parcels App tracking API (v3).
//
// Base path: api/v3/shipments/tracking
// Auth: apiKey carried in the request body (POST) or query string (GET)

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    ServiceStatus, SessionPollResponse, SubmitBody, SubmitResponse, SubmitShipment,
};
use crate::transport::TransportConfig;

const TRACKING_PATH: &str = "api/v3/shipments/tracking";

/// Bounded timeout for the lightweight reachability probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Async client for the Parcels App tracking API.
///
/// Exposes the two logical tracking operations -- submission and
/// session-token polling -- plus a bounded reachability probe. The
/// client holds the API key and locale parameters so callers only pass
/// tracking ids and tokens.
pub struct TrackingClient {
    http: reqwest::Client,
    base_url: Url,
    probe_url: Url,
    api_key: SecretString,
    destination_country: String,
    language: String,
}

impl TrackingClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from endpoint URLs, an API key, and locale parameters.
    ///
    /// `base_url` is the service root (e.g. `https://parcelsapp.com`);
    /// the tracking path is appended internally. `language` is
    /// truncated to its two-letter code and lowercased, matching what
    /// the upstream service accepts.
    pub fn new(
        base_url: Url,
        probe_url: Url,
        api_key: SecretString,
        destination_country: impl Into<String>,
        language: &str,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let language = language.chars().take(2).collect::<String>().to_lowercase();

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            probe_url,
            api_key,
            destination_country: destination_country.into(),
            language,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages transport).
    pub fn from_reqwest(
        http: reqwest::Client,
        base_url: Url,
        probe_url: Url,
        api_key: SecretString,
        destination_country: impl Into<String>,
        language: &str,
    ) -> Self {
        let language = language.chars().take(2).collect::<String>().to_lowercase();
        Self {
            http,
            base_url: normalize_base_url(base_url),
            probe_url,
            api_key,
            destination_country: destination_country.into(),
            language,
        }
    }

    /// The configured destination country.
    pub fn destination_country(&self) -> &str {
        &self.destination_country
    }

    /// The two-letter API language code.
    pub fn language(&self) -> &str {
        &self.language
    }

    // ── Tracking operations ──────────────────────────────────────────

    /// Submit a tracking id for resolution.
    ///
    /// The response carries either a session `uuid` (resolution is
    /// asynchronous upstream) or a resolved `shipments` list. An empty
    /// response with neither is possible and left to the caller to
    /// classify.
    pub async fn submit_tracking(&self, tracking_id: &str) -> Result<SubmitResponse, Error> {
        let body = SubmitBody {
            shipments: [SubmitShipment {
                tracking_id,
                destination_country: &self.destination_country,
            }],
            language: &self.language,
            api_key: self.api_key.expose_secret(),
        };

        self.post_json(self.tracking_url()?, &body).await
    }

    /// Poll a session token for completion.
    ///
    /// `done: false` means the upstream service is still resolving the
    /// shipment; poll again on the next cycle.
    pub async fn poll_by_session(&self, uuid: &str) -> Result<SessionPollResponse, Error> {
        let mut url = self.tracking_url()?;
        url.query_pairs_mut()
            .append_pair("uuid", uuid)
            .append_pair("apiKey", self.api_key.expose_secret())
            .append_pair("language", &self.language);

        debug!("GET {TRACKING_PATH} uuid={uuid}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    // ── Status probe ─────────────────────────────────────────────────

    /// Probe the service root for reachability.
    ///
    /// Bounded by a 10-second timeout independent of the transport
    /// timeout. A non-2xx answer is an error; the measured round-trip
    /// time covers the full body download.
    pub async fn probe_status(&self) -> Result<ServiceStatus, Error> {
        debug!("GET {} (probe)", self.probe_url);

        let started = Instant::now();
        let resp = tokio::time::timeout(PROBE_TIMEOUT, self.http.get(self.probe_url.clone()).send())
            .await
            .map_err(|_| Error::ProbeTimeout {
                timeout_secs: PROBE_TIMEOUT.as_secs(),
            })??;

        let status = resp.status();
        // Drain the body so response_time reflects a full round trip.
        let _ = resp.text().await;

        if status.is_success() {
            Ok(ServiceStatus {
                reachable: status == reqwest::StatusCode::OK,
                response_code: status.as_u16(),
                response_time: started.elapsed(),
            })
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                message: status.to_string(),
            })
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn tracking_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join(TRACKING_PATH)?)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::InvalidApiKey);
        }

        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}

/// Ensure the base URL path ends with a slash so `join` appends
/// instead of replacing the last segment.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
