//! Static queue-name lookup and small display helpers.

use chrono::{DateTime, Utc};

/// Known matchmaking queues (queue id, display name).
const QUEUE_NAMES: &[(u32, &str)] = &[
    (400, "Normal Draft"),
    (420, "Ranked Solo/Duo"),
    (430, "Normal Blind"),
    (440, "Ranked Flex"),
    (450, "ARAM"),
    (490, "Quickplay"),
    (700, "Clash"),
    (900, "URF"),
    (1020, "One for All"),
    (1700, "Arena"),
];

/// Human-readable name for a queue id, falling back to `"Queue <id>"`.
pub fn queue_name(queue_id: u32) -> String {
    QUEUE_NAMES
        .iter()
        .find(|(id, _)| *id == queue_id)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("Queue {}", queue_id))
}

/// Format a game duration in seconds as `m:ss`.
pub fn format_game_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Relative label for a game creation timestamp (epoch millis).
pub fn format_time_ago(created_at_millis: i64, now: DateTime<Utc>) -> String {
    let diff_ms = (now.timestamp_millis() - created_at_millis).max(0);
    let minutes = diff_ms / (1000 * 60);
    let hours = minutes / 60;
    let days = hours / 24;

    let plural = |n: i64, unit: &str| {
        format!("{} {}{} ago", n, unit, if n > 1 { "s" } else { "" })
    };

    if days > 0 {
        plural(days, "day")
    } else if hours > 0 {
        plural(hours, "hour")
    } else if minutes > 0 {
        plural(minutes, "minute")
    } else {
        "Just now".to_string()
    }
}
