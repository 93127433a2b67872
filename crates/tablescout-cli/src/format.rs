//! Plain-text output helpers shared by the command handlers.

/// Renders a section header line.
pub(crate) fn section_header(title: &str) -> String {
    format!("=== {title} ===")
}

/// Renders a rating with its review volume, e.g. `4.5/5 (1,234 reviews)`.
pub(crate) fn format_rating(rating: Option<f64>, review_count: Option<i64>) -> String {
    let Some(rating) = rating else {
        return "No rating".to_string();
    };
    match review_count {
        Some(count) if count > 0 => {
            format!("{rating:.1}/5 ({} reviews)", group_thousands(count))
        }
        _ => format!("{rating:.1}/5"),
    }
}

/// Maps a directory price level to dollar signs.
pub(crate) fn format_price_level(level: Option<&str>) -> &'static str {
    match level {
        Some("PRICE_LEVEL_INEXPENSIVE") => "$",
        Some("PRICE_LEVEL_MODERATE") => "$$",
        Some("PRICE_LEVEL_EXPENSIVE") => "$$$",
        Some("PRICE_LEVEL_VERY_EXPENSIVE") => "$$$$",
        _ => "?",
    }
}

/// Caps output at `max_chars` characters, cutting at the last line break
/// before the limit and appending a truncation marker. Output is consumed
/// by a messaging bridge with a hard message-size cap.
pub(crate) fn truncate_output(text: &str, max_chars: usize) -> String {
    const MARKER: &str = "\n[truncated]";
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let budget = max_chars.saturating_sub(MARKER.chars().count());
    let kept: String = text.chars().take(budget).collect();
    let cut = kept.rfind('\n').unwrap_or(kept.len());
    format!("{}{MARKER}", &kept[..cut])
}

fn group_thousands(n: i64) -> String {
    let digits = n.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Parses `HH:MM` (tolerating a seconds suffix) into minutes past midnight.
pub(crate) fn parse_hhmm(time: &str) -> Option<i32> {
    let mut parts = time.split(':');
    let hours: i32 = parts.next()?.trim().parse().ok()?;
    let minutes: i32 = parts.next()?.get(..2)?.parse().ok()?;
    Some(hours * 60 + minutes)
}
