// ── Current-location resolution ──
//
// Picks the best "where is it now" string for a shipment from its
// state history. The state list is not guaranteed chronological, so
// states are ranked by parsed date; undated states are only eligible
// when nothing dated is available. Total over malformed input: missing
// fields and unparsable dates never raise.

use chrono::{DateTime, Utc};

use parceltrace_api::models::Shipment;

use crate::model::status;

/// Resolve the current location of a shipment, or `None` if nothing
/// usable exists.
///
/// 1. The located state with the latest parseable date wins; the first
///    undated located state is held tentatively until a dated one
///    supersedes it.
/// 2. Two-letter alphabetic locations map through the country table;
///    unmapped codes pass through with their original casing.
/// 3. With no located state at all, a delivery-phase status falls back
///    to `destination`, then anything falls back to `origin`.
pub fn resolve(shipment: &Shipment) -> Option<String> {
    let mut best: Option<(&str, Option<DateTime<Utc>>)> = None;

    for state in &shipment.states {
        let Some(loc) = state.location.as_deref().filter(|l| !l.is_empty()) else {
            continue;
        };

        if let Some(date) = state.date.as_deref().and_then(parse_state_date) {
            let supersedes = match best {
                None | Some((_, None)) => true,
                Some((_, Some(current))) => date > current,
            };
            if supersedes {
                best = Some((loc, Some(date)));
            }
        } else if best.is_none() {
            best = Some((loc, None));
        }
    }

    if let Some((loc, _)) = best {
        return Some(expand_country_code(loc));
    }

    if status::is_delivery_phase(shipment.status.as_deref().unwrap_or("")) {
        if let Some(dest) = &shipment.destination {
            return Some(dest.clone());
        }
    }

    shipment.origin.clone()
}

/// Parse a state date as ISO-8601. A trailing `Z` is accepted as the
/// UTC offset `+00:00`.
fn parse_state_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Map a bare 2-letter alphabetic country code to its display name.
/// Anything else (including unmapped codes) passes through unchanged.
fn expand_country_code(loc: &str) -> String {
    let is_code = loc.chars().count() == 2 && loc.chars().all(|c| c.is_ascii_alphabetic());
    if is_code {
        if let Some(name) = country_name(&loc.to_ascii_uppercase()) {
            return name.to_owned();
        }
    }
    loc.to_owned()
}

/// Fixed country-code table for the carriers this service sees most.
fn country_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "NL" => "Netherlands",
        "DE" => "Germany",
        "BE" => "Belgium",
        "FR" => "France",
        "UK" | "GB" => "United Kingdom",
        "CN" => "China",
        "AT" => "Austria",
        "US" => "United States",
        "ES" => "Spain",
        "IT" => "Italy",
        "PL" => "Poland",
        "SE" => "Sweden",
        "NO" => "Norway",
        "FI" => "Finland",
        "DK" => "Denmark",
        "CH" => "Switzerland",
        "PT" => "Portugal",
        "IE" => "Ireland",
        "CA" => "Canada",
        "JP" => "Japan",
        _ => return None,
    };
    Some(name)
}
