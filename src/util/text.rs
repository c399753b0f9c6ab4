// src/util/text.rs
use chrono::{DateTime, Utc};

/// Human-readable size using binary units.
///
/// # Examples
///
/// ```
/// use studyshare::util::text::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    // at most two decimals, trailing zeros dropped
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Long date, e.g. "March 1, 2024".
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Coarse "time ago" description relative to `now`.
pub fn format_relative(date: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let seconds = (*now - *date).num_seconds();
    if seconds < 45 {
        return "less than a minute ago".to_string();
    }
    let minutes = (seconds + 30) / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = (minutes + 30) / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = (hours + 12) / 24;
    if days < 30 {
        return plural(days, "day");
    }
    let months = (days + 15) / 30;
    if months < 12 {
        return plural(months, "month");
    }
    plural(months / 12, "year")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Shortens text to `max_chars`, appending an ellipsis when cut.
pub fn clamp(text: &str, max_chars: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    let cut: String = single_line.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}
