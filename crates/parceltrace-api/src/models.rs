// Tracking API response types
//
// Models for the Parcels App v3 JSON API. Fields use `#[serde(default)]`
// liberally because the API is inconsistent about field presence across
// carriers, tracking phases, and locales. List-valued fields use a
// lenient deserializer: a missing, null, or wrongly-typed value decodes
// to an empty list instead of failing the whole response.

use serde::{Deserialize, Deserializer, Serialize};
use serde::de::DeserializeOwned;

// ── Lenient list decoding ────────────────────────────────────────────

/// Decode a JSON array into `Vec<T>`, dropping unparseable elements.
/// Anything that is not an array decodes to an empty vec.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

// ── Submission response ──────────────────────────────────────────────

/// Response to a tracking submission.
///
/// Carries either a session `uuid` (shipment not yet resolved -- poll
/// later with [`poll_by_session`](crate::TrackingClient::poll_by_session)),
/// a `shipments` list (resolved synchronously), or neither. The caller
/// classifies; this crate only decodes.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub shipments: Vec<Shipment>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response to a session-token poll.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionPollResponse {
    /// `true` once the shipment has been fully resolved upstream.
    #[serde(default)]
    pub done: bool,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub shipments: Vec<Shipment>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Shipment ─────────────────────────────────────────────────────────

/// A resolved shipment payload.
///
/// The API populates wildly different subsets of these fields depending
/// on carrier and tracking phase; everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Shipment {
    #[serde(default, rename = "trackingId")]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub eta: Option<Eta>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub attributes: Vec<Attribute>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub states: Vec<ShipmentState>,
    #[serde(default, rename = "lastState")]
    pub last_state: Option<LastState>,
    #[serde(default, rename = "detectedCarrier")]
    pub detected_carrier: Option<DetectedCarrier>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Estimated time of arrival, as a date window and a remaining-days window.
///
/// Both arrays nominally hold two elements but either position may be
/// null or missing entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Eta {
    #[serde(default)]
    pub period: Vec<Option<String>>,
    #[serde(default)]
    pub remaining: Vec<Option<f64>>,
}

/// A labelled attribute pair. The value can be a string, a number, or
/// anything else the upstream service decides to emit.
#[derive(Debug, Clone, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub l: Option<String>,
    #[serde(default)]
    pub val: serde_json::Value,
}

/// A timestamped waypoint in the shipment's history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipmentState {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The most recent carrier state, used for the human-readable message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LastState {
    #[serde(default)]
    pub status: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Carrier detected by the upstream service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectedCarrier {
    #[serde(default)]
    pub name: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Request bodies ───────────────────────────────────────────────────

/// One shipment entry in a submission request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitShipment<'a> {
    pub tracking_id: &'a str,
    pub destination_country: &'a str,
}

/// Submission request body. Field names are wire-exact.
#[derive(Debug, Serialize)]
pub(crate) struct SubmitBody<'a> {
    pub shipments: [SubmitShipment<'a>; 1],
    pub language: &'a str,
    #[serde(rename = "apiKey")]
    pub api_key: &'a str,
}

// ── Service status ───────────────────────────────────────────────────

/// Outcome of the lightweight reachability probe.
#[derive(Debug, Clone, Copy)]
pub struct ServiceStatus {
    /// `true` when the site answered 200.
    pub reachable: bool,
    /// HTTP status code of the probe response.
    pub response_code: u16,
    /// Measured round-trip time.
    pub response_time: std::time::Duration,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn submit_response_with_uuid_only() {
        let resp: SubmitResponse = serde_json::from_str(r#"{"uuid":"abc-123"}"#).unwrap();
        assert_eq!(resp.uuid.as_deref(), Some("abc-123"));
        assert!(resp.shipments.is_empty());
    }

    #[test]
    fn shipment_tolerates_non_list_states() {
        let resp: Shipment =
            serde_json::from_str(r#"{"status":"in_transit","states":"oops"}"#).unwrap();
        assert!(resp.states.is_empty());
        assert_eq!(resp.status.as_deref(), Some("in_transit"));
    }

    #[test]
    fn lenient_vec_drops_malformed_elements() {
        let resp: Shipment = serde_json::from_str(
            r#"{"states":[{"location":"Berlin","date":"2024-03-01T08:00:00Z"},42]}"#,
        )
        .unwrap();
        assert_eq!(resp.states.len(), 1);
        assert_eq!(resp.states[0].location.as_deref(), Some("Berlin"));
    }

    #[test]
    fn eta_positions_may_be_null() {
        let eta: Eta = serde_json::from_str(r#"{"period":[null,"2024-03-10"],"remaining":[2,null]}"#)
            .unwrap();
        assert_eq!(eta.period.len(), 2);
        assert!(eta.period[0].is_none());
        assert_eq!(eta.remaining[0], Some(2.0));
        assert!(eta.remaining[1].is_none());
    }

    #[test]
    fn submit_body_uses_wire_field_names() {
        let body = SubmitBody {
            shipments: [SubmitShipment {
                tracking_id: "RR123456789NL",
                destination_country: "Germany",
            }],
            language: "en",
            api_key: "key",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["shipments"][0]["trackingId"], "RR123456789NL");
        assert_eq!(json["shipments"][0]["destinationCountry"], "Germany");
        assert_eq!(json["apiKey"], "key");
    }
}
