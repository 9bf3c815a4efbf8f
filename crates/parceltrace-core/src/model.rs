// ── Canonical package record and merge patch ──
//
// `TrackedPackage` is the single canonical record per tracking id.
// All mutation goes through `merge(PackagePatch)`: a patch applies
// only the fields it explicitly carries, so a payload that omits a
// field can never erase it. This replaces the original map-spread
// merge, where a typed default could silently null out user data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Status vocabulary ────────────────────────────────────────────────

/// Status strings recognized by this crate. The upstream vocabulary is
/// open; anything else is carried through as an opaque string.
pub mod status {
    pub const PENDING: &str = "pending";
    pub const IN_TRANSIT: &str = "in_transit";
    pub const DELIVERED: &str = "delivered";
    pub const OUT_FOR_DELIVERY: &str = "out_for_delivery";
    pub const PICKUP: &str = "pickup";
    pub const READY_FOR_PICKUP: &str = "ready_for_pickup";
    pub const ARCHIVED: &str = "archived";
    pub const UNKNOWN: &str = "unknown";

    /// Terminal statuses are skipped by the poll cycle.
    pub fn is_terminal(status: &str) -> bool {
        status.eq_ignore_ascii_case(DELIVERED) || status.eq_ignore_ascii_case(ARCHIVED)
    }

    /// Statuses in the final delivery phase, where the destination is
    /// the best guess for the package's whereabouts.
    pub fn is_delivery_phase(status: &str) -> bool {
        status.eq_ignore_ascii_case(DELIVERED)
            || status.eq_ignore_ascii_case(OUT_FOR_DELIVERY)
            || status.eq_ignore_ascii_case(PICKUP)
            || status.eq_ignore_ascii_case(READY_FOR_PICKUP)
    }
}

// ── TrackedPackage ───────────────────────────────────────────────────

/// Canonical per-package record, keyed by tracking id.
///
/// Either the session pair (`session_token` + `session_issued_at`) is
/// set and the shipment fields are stale, or the session pair is clear
/// and the shipment fields come from the last resolved payload. The
/// merge logic never produces a half-set session pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPackage {
    /// Opaque external identifier, primary key. Never overwritten.
    pub tracking_id: String,
    /// Latest known status; open vocabulary, see [`status`].
    pub status: String,
    /// Human-readable latest status text.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub days_in_transit: Option<i64>,
    #[serde(default)]
    pub eta_days_range: Option<String>,
    #[serde(default)]
    pub eta_date_range: Option<String>,
    #[serde(default)]
    pub expected_delivery: Option<String>,
    /// Token for polling an unresolved shipment.
    #[serde(default)]
    pub session_token: Option<String>,
    /// Set if and only if `session_token` is set.
    #[serde(default)]
    pub session_issued_at: Option<DateTime<Utc>>,
    /// User-assigned label; once set, never erased by a merge.
    #[serde(default)]
    pub name: Option<String>,
    /// Timestamp of the last successful merge.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl TrackedPackage {
    /// Fresh record for a newly submitted tracking id.
    pub fn new(tracking_id: impl Into<String>) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            status: status::UNKNOWN.to_owned(),
            message: String::new(),
            location: None,
            origin: None,
            destination: None,
            carrier: None,
            days_in_transit: None,
            eta_days_range: None,
            eta_date_range: None,
            expected_delivery: None,
            session_token: None,
            session_issued_at: None,
            name: None,
            last_updated: None,
        }
    }

    /// Apply a patch, field by field. Fields the patch does not carry
    /// are left untouched.
    pub fn merge(&mut self, patch: PackagePatch) {
        if let Field::Set(v) = patch.status {
            self.status = v;
        }
        if let Field::Set(v) = patch.message {
            self.message = v;
        }

        apply(patch.location, &mut self.location);
        apply(patch.origin, &mut self.origin);
        apply(patch.destination, &mut self.destination);
        apply(patch.carrier, &mut self.carrier);
        apply(patch.days_in_transit, &mut self.days_in_transit);
        apply(patch.eta_days_range, &mut self.eta_days_range);
        apply(patch.eta_date_range, &mut self.eta_date_range);
        apply(patch.expected_delivery, &mut self.expected_delivery);

        // The token and its issue timestamp move together.
        match patch.session {
            Field::Keep => {}
            Field::Clear => {
                self.session_token = None;
                self.session_issued_at = None;
            }
            Field::Set((token, issued_at)) => {
                self.session_token = Some(token);
                self.session_issued_at = Some(issued_at);
            }
        }

        // Identity fields only ever gain a value.
        if let Field::Set(v) = patch.name {
            self.name = Some(v);
        }
        if let Field::Set(v) = patch.last_updated {
            self.last_updated = Some(v);
        }
    }
}

fn apply<T>(field: Field<T>, slot: &mut Option<T>) {
    match field {
        Field::Keep => {}
        Field::Clear => *slot = None,
        Field::Set(v) => *slot = Some(v),
    }
}

// ── Field / PackagePatch ─────────────────────────────────────────────

/// A three-state field update: leave untouched, clear, or replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Keep,
    Clear,
    Set(T),
}

// Manual impl: the derive would bound `T: Default`, which the session
// pair's timestamp does not satisfy.
impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T> Field<T> {
    /// `Set` for `Some`, `Clear` for `None`. Used when a payload shape
    /// explicitly carries a field and absence means "no value".
    pub fn replace_with(opt: Option<T>) -> Self {
        opt.map_or(Self::Clear, Self::Set)
    }
}

/// Explicit merge patch for [`TrackedPackage`].
///
/// The default patch is a no-op: merging it leaves the record
/// unchanged. `tracking_id` has no slot here on purpose -- the primary
/// key is never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackagePatch {
    pub status: Field<String>,
    pub message: Field<String>,
    pub location: Field<String>,
    pub origin: Field<String>,
    pub destination: Field<String>,
    pub carrier: Field<String>,
    pub days_in_transit: Field<i64>,
    pub eta_days_range: Field<String>,
    pub eta_date_range: Field<String>,
    pub expected_delivery: Field<String>,
    /// Session token and issue timestamp, patched as a pair.
    pub session: Field<(String, DateTime<Utc>)>,
    /// `Set` only; a patch can never erase the user-assigned name.
    pub name: Field<String>,
    pub last_updated: Field<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record_with_name() -> TrackedPackage {
        let mut pkg = TrackedPackage::new("RR1");
        pkg.name = Some("Birthday present".into());
        pkg.origin = Some("Netherlands".into());
        pkg
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let pkg = record_with_name();
        let mut merged = pkg.clone();
        merged.merge(PackagePatch::default());
        assert_eq!(merged, pkg);
    }

    #[test]
    fn set_replaces_and_clear_erases() {
        let mut pkg = record_with_name();
        pkg.merge(PackagePatch {
            status: Field::Set("in_transit".into()),
            origin: Field::Clear,
            location: Field::Set("Germany".into()),
            ..PackagePatch::default()
        });
        assert_eq!(pkg.status, "in_transit");
        assert_eq!(pkg.origin, None);
        assert_eq!(pkg.location.as_deref(), Some("Germany"));
    }

    #[test]
    fn name_survives_any_patch() {
        let mut pkg = record_with_name();
        pkg.merge(PackagePatch {
            name: Field::Clear, // nonsensical, must be ignored
            status: Field::Set("delivered".into()),
            ..PackagePatch::default()
        });
        assert_eq!(pkg.name.as_deref(), Some("Birthday present"));
    }

    #[test]
    fn session_pair_moves_together() {
        let now = Utc::now();
        let mut pkg = record_with_name();
        pkg.merge(PackagePatch {
            session: Field::Set(("abc".into(), now)),
            ..PackagePatch::default()
        });
        assert_eq!(pkg.session_token.as_deref(), Some("abc"));
        assert_eq!(pkg.session_issued_at, Some(now));

        pkg.merge(PackagePatch {
            session: Field::Clear,
            ..PackagePatch::default()
        });
        assert!(pkg.session_token.is_none());
        assert!(pkg.session_issued_at.is_none());
    }

    #[test]
    fn terminal_and_delivery_phase_statuses() {
        assert!(status::is_terminal("delivered"));
        assert!(status::is_terminal("DELIVERED"));
        assert!(status::is_terminal("archived"));
        assert!(!status::is_terminal("in_transit"));

        assert!(status::is_delivery_phase("out_for_delivery"));
        assert!(status::is_delivery_phase("Ready_For_Pickup"));
        assert!(!status::is_delivery_phase("pending"));
    }

    #[test]
    fn record_round_trips_through_serde() {
        let mut pkg = record_with_name();
        pkg.session_token = Some("abc".into());
        pkg.session_issued_at = Some(Utc::now());

        let json = serde_json::to_string(&pkg).unwrap();
        let back: TrackedPackage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pkg);
    }
}
