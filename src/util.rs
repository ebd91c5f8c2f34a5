/// Format a duration in seconds as a compact human-readable string.
pub fn format_duration(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Elapsed time from `then` to `now` (unix seconds), for "... ago" texts.
/// Timestamps in the future read as `0s`.
pub fn time_ago(then: i64, now: i64) -> String {
    format_duration(now.saturating_sub(then).max(0) as u64)
}
