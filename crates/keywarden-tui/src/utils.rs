//! Small formatting helpers for display.

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

/// Format an API date string to a more readable form
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y %H:%M").to_string()
    } else if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.format("%b %d, %Y %H:%M").to_string()
    } else if date.len() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_strings() {
        assert_eq!(truncate_string("abcdef", 6), "abcdef");
        assert_eq!(truncate_string("abcdefgh", 6), "abc...");
        assert_eq!(truncate_string("abcdef", 2), "ab");
    }

    #[test]
    fn formats_naive_api_dates() {
        assert_eq!(format_date("2024-03-01T09:30:00"), "Mar 01, 2024 09:30");
        assert_eq!(format_date("2024-03-01T09:30:00.123456"), "Mar 01, 2024 09:30");
    }

    #[test]
    fn falls_back_to_date_prefix() {
        assert_eq!(format_date("2024-03-01 extra"), "2024-03-01");
        assert_eq!(format_date("n/a"), "n/a");
    }
}
