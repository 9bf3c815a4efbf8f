// ── Tracker ──
//
// Orchestrates the whole lifecycle: submit new tracking ids, poll
// pending sessions, fold resolved shipments into the store, and
// persist after every mutation. All API traffic within a cycle is
// strictly sequential -- the upstream service rate-limits aggressively
// and one slow carrier lookup must not fan out.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use parceltrace_api::models::ServiceStatus;
use parceltrace_api::{TrackingClient, TransportConfig};

use crate::config::TrackerConfig;
use crate::error::CoreError;
use crate::model::{Field, PackagePatch, status};
use crate::reconcile::{self, SubmitOutcome};
use crate::session::{self, SessionDisposition};
use crate::storage::StorageBackend;
use crate::store::PackageStore;

/// Outcome of one full poll cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Result of the reachability probe, when it completed.
    pub service_status: Option<ServiceStatus>,
    /// Probe failure message; the cycle still ran.
    pub probe_failure: Option<String>,
    /// Packages successfully updated this cycle.
    pub updated: usize,
    /// Packages whose update failed; retried next cycle.
    pub failed: usize,
}

/// Tracking coordinator: owns the client, the in-memory store, and a
/// persistence backend.
pub struct Tracker<S> {
    client: TrackingClient,
    storage: S,
    store: PackageStore,
    poll_interval_secs: u64,
}

impl<S: StorageBackend> Tracker<S> {
    pub fn new(config: &TrackerConfig, storage: S) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let client = TrackingClient::new(
            config.endpoint.clone(),
            config.probe_url.clone(),
            config.api_key.clone(),
            config.destination_country.clone(),
            &config.language,
            &transport,
        )?;

        Ok(Self {
            client,
            storage,
            store: PackageStore::new(),
            poll_interval_secs: config.poll_interval_secs,
        })
    }

    /// Load previously persisted packages into the store.
    pub async fn initialize(&mut self) -> Result<(), CoreError> {
        let packages = self.storage.load_all().await?;
        info!(count = packages.len(), "loaded persisted packages");
        self.store = PackageStore::from_map(packages);
        Ok(())
    }

    pub fn store(&self) -> &PackageStore {
        &self.store
    }

    // ── Package management ───────────────────────────────────────────

    /// Start tracking a package. Submits the id upstream, records the
    /// outcome (pending session or resolved shipment), and persists.
    ///
    /// Re-submitting an id that is already tracked refreshes it in
    /// place; an existing name is kept unless a new one is given.
    pub async fn track_package(
        &mut self,
        tracking_id: &str,
        name: Option<&str>,
    ) -> Result<(), CoreError> {
        let response = match self.client.submit_tracking(tracking_id).await {
            Ok(response) => response,
            Err(err) => {
                log_api_failure(tracking_id, &err);
                return Err(err.into());
            }
        };

        let now = Utc::now();
        let mut patch = match reconcile::classify_submit(response) {
            SubmitOutcome::Session(token) => {
                debug!(tracking_id, "submission pending, session token issued");
                reconcile::session_patch(token, now)
            }
            SubmitOutcome::Shipment(shipment) => {
                debug!(tracking_id, "submission resolved inline");
                reconcile::shipment_patch(&shipment, now)
            }
            SubmitOutcome::Unrecognized => {
                warn!(tracking_id, "submit response had no token and no shipments");
                return Err(CoreError::UnrecognizedResponse {
                    tracking_id: tracking_id.to_owned(),
                });
            }
        };
        if let Some(name) = name {
            patch.name = Field::Set(name.to_owned());
        }

        let existing = self.store.get(tracking_id).cloned();
        self.store
            .put(reconcile::reconcile(existing, tracking_id, patch));
        self.persist().await
    }

    /// Stop tracking a package. Removing an id that was never tracked
    /// is a no-op.
    pub async fn remove_package(&mut self, tracking_id: &str) -> Result<(), CoreError> {
        if self.store.remove(tracking_id).is_none() {
            warn!(tracking_id, "remove requested for untracked id");
            return Ok(());
        }
        info!(tracking_id, "stopped tracking package");
        self.persist().await
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// Refresh a single package: reuse its session token when still
    /// valid, otherwise re-submit for a fresh one, then poll.
    pub async fn update_package(&mut self, tracking_id: &str) -> Result<(), CoreError> {
        let Some(record) = self.store.get(tracking_id) else {
            return Err(CoreError::UnrecognizedResponse {
                tracking_id: tracking_id.to_owned(),
            });
        };

        let disposition = session::session_disposition(
            record.session_token.as_deref(),
            record.session_issued_at,
            Utc::now(),
        );

        let token = match disposition {
            SessionDisposition::Reuse { token } => token,
            SessionDisposition::Refresh => {
                debug!(tracking_id, "session stale or absent, re-submitting");
                match self.resubmit(tracking_id).await? {
                    Some(token) => token,
                    // Resolved inline; nothing left to poll.
                    None => return Ok(()),
                }
            }
        };

        let response = match self.client.poll_by_session(&token).await {
            Ok(response) => response,
            Err(err) => {
                log_api_failure(tracking_id, &err);
                return Err(err.into());
            }
        };

        if response.done && !response.shipments.is_empty() {
            let now = Utc::now();
            // One id per poll; only the first shipment can be ours.
            if let Some(shipment) = response.shipments.first() {
                let patch = reconcile::shipment_patch(shipment, now);
                let existing = self.store.get(tracking_id).cloned();
                self.store
                    .put(reconcile::reconcile(existing, tracking_id, patch));
                self.persist().await?;
            }
        } else {
            debug!(tracking_id, done = response.done, "tracking data not yet available");
        }
        Ok(())
    }

    /// Run one poll cycle: probe the service, then update every
    /// non-terminal package sequentially. Individual failures are
    /// recorded and do not stop the cycle.
    pub async fn poll_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        match self.client.probe_status().await {
            Ok(service_status) => {
                debug!(
                    response_code = service_status.response_code,
                    response_time_ms = service_status.response_time.as_millis() as u64,
                    "tracking service reachable"
                );
                report.service_status = Some(service_status);
            }
            Err(err) => {
                warn!(error = %err, "service status probe failed");
                report.probe_failure = Some(err.to_string());
            }
        }

        let pending: Vec<String> = self
            .store
            .all()
            .filter(|pkg| !status::is_terminal(&pkg.status))
            .map(|pkg| pkg.tracking_id.clone())
            .collect();

        for tracking_id in pending {
            match self.update_package(&tracking_id).await {
                Ok(()) => report.updated += 1,
                Err(err) => {
                    warn!(tracking_id, error = %err, "package update failed");
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Poll on a fixed interval until cancelled. The first tick fires
    /// immediately.
    pub async fn run_poll_loop(&mut self, cancel: CancellationToken) {
        let period = std::time::Duration::from_secs(self.poll_interval_secs);
        let mut interval = tokio::time::interval(period);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!("poll loop cancelled");
                    break;
                }
                _ = interval.tick() => {
                    let report = self.poll_cycle().await;
                    info!(
                        updated = report.updated,
                        failed = report.failed,
                        "poll cycle complete"
                    );
                }
            }
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Re-submit a tracking id whose session has lapsed. Returns the
    /// fresh token, or `None` if the response resolved inline (in
    /// which case the store has already been updated).
    async fn resubmit(&mut self, tracking_id: &str) -> Result<Option<String>, CoreError> {
        let response = match self.client.submit_tracking(tracking_id).await {
            Ok(response) => response,
            Err(err) => {
                log_api_failure(tracking_id, &err);
                return Err(err.into());
            }
        };

        let now = Utc::now();
        match reconcile::classify_submit(response) {
            SubmitOutcome::Session(token) => {
                let patch = PackagePatch {
                    session: Field::Set((token.clone(), now)),
                    last_updated: Field::Set(now),
                    ..PackagePatch::default()
                };
                let existing = self.store.get(tracking_id).cloned();
                self.store
                    .put(reconcile::reconcile(existing, tracking_id, patch));
                self.persist().await?;
                Ok(Some(token))
            }
            SubmitOutcome::Shipment(shipment) => {
                let patch = reconcile::shipment_patch(&shipment, now);
                let existing = self.store.get(tracking_id).cloned();
                self.store
                    .put(reconcile::reconcile(existing, tracking_id, patch));
                self.persist().await?;
                Ok(None)
            }
            SubmitOutcome::Unrecognized => {
                warn!(tracking_id, "re-submit response had no token and no shipments");
                Err(CoreError::UnrecognizedResponse {
                    tracking_id: tracking_id.to_owned(),
                })
            }
        }
    }

    async fn persist(&self) -> Result<(), CoreError> {
        self.storage.save_all(self.store.as_map()).await
    }
}

/// Log an API failure with as much context as the error carries. A
/// decode failure logs the raw body so the offending payload is not
/// lost.
fn log_api_failure(tracking_id: &str, err: &parceltrace_api::Error) {
    if let parceltrace_api::Error::Deserialization { message, body } = err {
        warn!(tracking_id, %message, raw_body = %body, "undecodable API response");
    } else {
        warn!(tracking_id, error = %err, "tracking API request failed");
    }
}
