// ── ETA and attribute extraction ──
//
// Pure functions pulling derived display fields out of a raw shipment.
// Every rule degrades to "absent" on missing or malformed data; nothing
// here can fail.

use parceltrace_api::models::Shipment;

/// Extract the ETA day-range and date-range display strings.
///
/// The day range formats as `"{low}-{high}"` (plain ASCII hyphen) and
/// requires both positions of `eta.remaining` to be present and
/// non-null. The date range formats as `"{start}/{end}"` and requires
/// both positions of `eta.period` to be non-empty.
pub fn eta_ranges(shipment: &Shipment) -> (Option<String>, Option<String>) {
    let Some(eta) = &shipment.eta else {
        return (None, None);
    };

    let days = match (eta.remaining.first(), eta.remaining.get(1)) {
        (Some(Some(low)), Some(Some(high))) => Some(format!("{low}-{high}")),
        _ => None,
    };

    let dates = match (eta.period.first(), eta.period.get(1)) {
        (Some(Some(start)), Some(Some(end))) if !start.is_empty() && !end.is_empty() => {
            Some(format!("{start}/{end}"))
        }
        _ => None,
    };

    (days, dates)
}

/// The expected-delivery window string from the `"eta"` attribute.
/// The last matching attribute wins.
pub fn expected_delivery(shipment: &Shipment) -> Option<String> {
    shipment
        .attributes
        .iter()
        .rev()
        .find(|attr| attr.l.as_deref() == Some("eta"))
        .and_then(|attr| value_as_string(&attr.val))
}

/// Transit-day count from the first `"days_transit"` attribute.
pub fn days_in_transit(shipment: &Shipment) -> Option<i64> {
    shipment
        .attributes
        .iter()
        .find(|attr| attr.l.as_deref() == Some("days_transit"))
        .and_then(|attr| value_as_i64(&attr.val))
}

/// Attribute values arrive as strings or numbers, depending on carrier.
fn value_as_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
