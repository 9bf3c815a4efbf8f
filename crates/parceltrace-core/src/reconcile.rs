// ── Reconciliation ──
//
// Turns raw upstream payloads into `PackagePatch`es and folds them
// into the canonical record. A resolved shipment replaces every
// informational field it carries (and clears the ones it does not,
// absence of a location in a fresh payload means the location is
// gone); a session acknowledgement only parks the record as pending.

use chrono::{DateTime, Utc};

use parceltrace_api::models::{Shipment, SubmitResponse};

use crate::extract;
use crate::location;
use crate::model::{Field, PackagePatch, TrackedPackage, status};

/// Status text shown while a submission is still waiting for upstream
/// to resolve the carrier.
pub const MSG_TRACKING_INITIATED: &str = "Tracking initiated";
/// Status text used when a resolved shipment carries no last state.
pub const MSG_NO_STATUS: &str = "No status available";

/// How a submit response should be handled.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Upstream returned a session token; the shipment resolves later.
    Session(String),
    /// Upstream resolved the shipment inline.
    Shipment(Box<Shipment>),
    /// Neither a token nor a shipment -- nothing usable to record.
    Unrecognized,
}

/// Classify a submit response. A session token takes precedence over
/// any shipments riding along in the same payload.
pub fn classify_submit(response: SubmitResponse) -> SubmitOutcome {
    if let Some(uuid) = response.uuid.filter(|u| !u.is_empty()) {
        return SubmitOutcome::Session(uuid);
    }
    match response.shipments.into_iter().next() {
        Some(shipment) => SubmitOutcome::Shipment(Box::new(shipment)),
        None => SubmitOutcome::Unrecognized,
    }
}

/// Patch carrying everything a resolved shipment tells us. Clears the
/// session pair -- a resolved payload supersedes any pending lookup.
pub fn shipment_patch(shipment: &Shipment, now: DateTime<Utc>) -> PackagePatch {
    let (eta_days_range, eta_date_range) = extract::eta_ranges(shipment);
    let message = shipment
        .last_state
        .as_ref()
        .and_then(|s| s.status.clone())
        .unwrap_or_else(|| MSG_NO_STATUS.to_owned());

    PackagePatch {
        status: Field::Set(
            shipment
                .status
                .clone()
                .unwrap_or_else(|| status::UNKNOWN.to_owned()),
        ),
        message: Field::Set(message),
        location: Field::replace_with(location::resolve(shipment)),
        origin: Field::replace_with(shipment.origin.clone()),
        destination: Field::replace_with(shipment.destination.clone()),
        carrier: Field::replace_with(
            shipment
                .detected_carrier
                .as_ref()
                .and_then(|c| c.name.clone()),
        ),
        days_in_transit: Field::replace_with(extract::days_in_transit(shipment)),
        eta_days_range: Field::replace_with(eta_days_range),
        eta_date_range: Field::replace_with(eta_date_range),
        expected_delivery: Field::replace_with(extract::expected_delivery(shipment)),
        session: Field::Clear,
        name: Field::Keep,
        last_updated: Field::Set(now),
    }
}

/// Patch for a freshly issued session token: the record goes pending
/// and keeps every informational field it already had.
pub fn session_patch(token: String, now: DateTime<Utc>) -> PackagePatch {
    PackagePatch {
        status: Field::Set(status::PENDING.to_owned()),
        message: Field::Set(MSG_TRACKING_INITIATED.to_owned()),
        session: Field::Set((token, now)),
        last_updated: Field::Set(now),
        ..PackagePatch::default()
    }
}

/// Fold a patch into the existing record for `tracking_id`, creating a
/// fresh one if this id has never been seen.
pub fn reconcile(
    existing: Option<TrackedPackage>,
    tracking_id: &str,
    patch: PackagePatch,
) -> TrackedPackage {
    let mut record = existing.unwrap_or_else(|| TrackedPackage::new(tracking_id));
    record.merge(patch);
    record
}
