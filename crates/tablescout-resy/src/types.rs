//! Wire types for the Resy API.
//!
//! The find endpoint is loosely typed upstream: venue and config ids arrive
//! as either numbers or strings depending on the endpoint version, so ids
//! are held as raw JSON values and stringified on the way out.

use serde::Deserialize;
use tablescout_core::types::Slot;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FindResponse {
    #[serde(default)]
    pub results: FindResults,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FindResults {
    #[serde(default)]
    pub venues: Vec<VenueEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VenueEntry {
    #[serde(default)]
    pub venue: VenueInfo,
    #[serde(default)]
    pub slots: Vec<SlotEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VenueInfo {
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SlotEntry {
    #[serde(default)]
    pub config: SlotConfig,
    #[serde(default)]
    pub date: SlotDate,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SlotConfig {
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub token: String,
    #[serde(default, rename = "type")]
    pub seating_type: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SlotDate {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DetailsResponse {
    #[serde(default)]
    pub book_token: BookToken,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BookToken {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BookResponse {
    #[serde(default)]
    pub resy_token: String,
    pub reservation_id: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserResponse {
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub mobile_number: String,
}

/// Renders a loosely typed id as a string; numbers lose no precision and
/// anything else collapses to empty.
pub(crate) fn stringify_id(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn slot_from_entry(entry: SlotEntry) -> Slot {
    Slot {
        config_id: stringify_id(entry.config.id.as_ref()),
        token: entry.config.token,
        seating_type: entry.config.seating_type,
        time: entry.date.start,
        end_time: entry.date.end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringify_id_handles_numbers_and_strings() {
        assert_eq!(stringify_id(Some(&serde_json::json!(42))), "42");
        assert_eq!(stringify_id(Some(&serde_json::json!("rgs://x"))), "rgs://x");
        assert_eq!(stringify_id(Some(&serde_json::json!(null))), "");
        assert_eq!(stringify_id(None), "");
    }

    #[test]
    fn find_response_tolerates_missing_sections() {
        let parsed: FindResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.venues.is_empty());
    }

    #[test]
    fn slot_from_entry_flattens_config_and_date() {
        let entry: SlotEntry = serde_json::from_value(serde_json::json!({
            "config": { "id": 991, "token": "tok_1", "type": "Dining Room" },
            "date": { "start": "2026-09-01 19:00:00", "end": "2026-09-01 20:30:00" }
        }))
        .unwrap();
        let slot = slot_from_entry(entry);
        assert_eq!(slot.config_id, "991");
        assert_eq!(slot.token, "tok_1");
        assert_eq!(slot.seating_type, "Dining Room");
        assert_eq!(slot.time, "2026-09-01 19:00:00");
    }
}
