use chrono::NaiveDate;

use super::timeline::DateRange;

const ELLIPSIS: &str = "...";

/// Cuts `text` to `max_chars` characters, appending `...` when anything was
/// dropped. Whitespace runs (including newlines) collapse to single spaces.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() <= max_chars {
        return normalized;
    }
    let mut out: String = normalized.chars().take(max_chars).collect();
    out.push_str(ELLIPSIS);
    out
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => "No date".to_string(),
    }
}

/// `2024-01-01 → 2024-01-31 (30 days)`
pub fn range_caption(range: &DateRange) -> String {
    let days = range.duration_days();
    format!(
        "{} → {} ({} {})",
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d"),
        days,
        if days == 1 { "day" } else { "days" }
    )
}

pub fn indent(level: usize) -> String {
    "  ".repeat(level)
}
