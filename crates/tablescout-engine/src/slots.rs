//! Time-slot proximity matching.

use tablescout_core::types::Slot;

/// Minutes either side of the target within which a slot is acceptable.
const WINDOW_MINUTES: i32 = 120;

/// Score given to a slot whose start time cannot be parsed. Far outside the
/// window, so unparseable slots never survive the filter, but they are
/// scored rather than dropped so the sort stays total.
const UNRANKED: i32 = 9999;

/// Filters and sorts slots by proximity to `target_time` (`HH:MM`).
///
/// Returns the slots within two hours of the target, nearest first; ties
/// keep their original relative order. An empty or unparseable target
/// returns the input unchanged. If the window filters everything out the
/// result is empty; falling back to the unfiltered list is the caller's
/// decision, not the matcher's.
#[must_use]
pub fn filter_slots(slots: &[Slot], target_time: &str) -> Vec<Slot> {
    let Some(target_minutes) = parse_minutes(target_time) else {
        return slots.to_vec();
    };
    if slots.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(i32, &Slot)> = slots
        .iter()
        .map(|slot| {
            let score = parse_minutes(&slot.time)
                .map_or(UNRANKED, |minutes| (minutes - target_minutes).abs());
            (score, slot)
        })
        .collect();
    scored.sort_by_key(|(score, _)| *score);

    scored
        .into_iter()
        .filter(|(score, _)| *score <= WINDOW_MINUTES)
        .map(|(_, slot)| slot.clone())
        .collect()
}

/// Parses a time fragment into minutes past midnight, tolerating `HH:MM`,
/// `HH:MM:SS`, redundant `:00:00` suffixes, and trailing meridiem text
/// (`7:30 PM` reads the digits as-is). Returns `None` for anything else.
fn parse_minutes(time: &str) -> Option<i32> {
    let normalized = time.replace(":00:00", ":00");
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() < 2 {
        return None;
    }
    let hours: i32 = parts[0].trim().parse().ok()?;
    let minute_digits: String = parts[1].chars().take(2).collect();
    let minutes: i32 = minute_digits.parse().ok()?;
    Some(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(time: &str) -> Slot {
        Slot {
            config_id: format!("cfg_{time}"),
            token: String::new(),
            seating_type: String::new(),
            time: time.to_string(),
            end_time: String::new(),
        }
    }

    #[test]
    fn nearest_slot_sorts_first_with_stable_ties() {
        let slots = vec![slot("18:00"), slot("19:30"), slot("21:00")];
        let ordered = filter_slots(&slots, "19:30");
        let times: Vec<&str> = ordered.iter().map(|s| s.time.as_str()).collect();
        // 18:00 and 21:00 are both 90 minutes away; input order breaks the tie.
        assert_eq!(times, vec!["19:30", "18:00", "21:00"]);
    }

    #[test]
    fn slots_beyond_two_hours_are_dropped() {
        let slots = vec![slot("12:00"), slot("18:30"), slot("22:00")];
        let ordered = filter_slots(&slots, "19:00");
        let times: Vec<&str> = ordered.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["18:30"]);
    }

    #[test]
    fn output_is_always_a_subset_within_the_window() {
        let slots = vec![slot("17:45"), slot("19:00"), slot("09:00"), slot("20:59")];
        let ordered = filter_slots(&slots, "19:00");
        assert!(ordered.len() <= slots.len());
        for s in &ordered {
            let diff = (parse_minutes(&s.time).unwrap() - parse_minutes("19:00").unwrap()).abs();
            assert!(diff <= 120, "slot {} is outside the window", s.time);
        }
        // Non-decreasing proximity.
        let diffs: Vec<i32> = ordered
            .iter()
            .map(|s| (parse_minutes(&s.time).unwrap() - 19 * 60).abs())
            .collect();
        assert!(diffs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn unparseable_target_passes_slots_through() {
        let slots = vec![slot("23:30"), slot("12:00")];
        assert_eq!(filter_slots(&slots, ""), slots);
        assert_eq!(filter_slots(&slots, "evening"), slots);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(filter_slots(&[], "19:00").is_empty());
    }

    #[test]
    fn unparseable_slot_times_are_unranked_not_fatal() {
        let slots = vec![slot("not-a-time"), slot("19:15")];
        let ordered = filter_slots(&slots, "19:00");
        let times: Vec<&str> = ordered.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["19:15"]);
    }

    #[test]
    fn tolerates_seconds_and_meridiem_fragments() {
        assert_eq!(parse_minutes("19:30"), Some(1170));
        assert_eq!(parse_minutes("19:30:00"), Some(1170));
        assert_eq!(parse_minutes("19:00:00"), Some(1140));
        assert_eq!(parse_minutes("7:30 PM"), Some(450));
        assert_eq!(parse_minutes("19"), None);
        assert_eq!(parse_minutes(""), None);
    }
}
