//! Human-readable formatting helpers for sizes, timestamps and table cells.

use chrono::DateTime;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// Format a byte count using 1024-based units with one decimal place.
///
/// Zero is rendered as `Unknown`, since GitHub reports a missing size as 0.
pub fn format_size(bytes: u64) -> String {
    match bytes {
        0 => "Unknown".to_string(),
        b if b >= GB => format!("{:.1}GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1}MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1}KB", b as f64 / KB as f64),
        b => format!("{}B", b),
    }
}

/// Format an RFC 3339 timestamp as `YYYY-MM-DD HH:MM`.
///
/// Unparseable input is returned unchanged.
pub fn format_created_at(created_at: &str) -> String {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => created_at.to_string(),
    }
}

/// Truncate to at most `max_len` characters, ending in `...` when shortened.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "Unknown");
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(1024), "1.0KB");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(10 * MB), "10.0MB");
        assert_eq!(format_size(3 * GB + GB / 2), "3.5GB");
    }

    #[test]
    fn test_format_created_at() {
        assert_eq!(format_created_at("2024-03-05T14:07:33Z"), "2024-03-05 14:07");
        assert_eq!(format_created_at("yesterday"), "yesterday");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short.zip", 40), "short.zip");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("abcdefghij", 10), "abcdefghij");
    }
}
