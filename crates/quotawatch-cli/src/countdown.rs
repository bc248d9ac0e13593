//! Countdown and timestamp formatting for quota reset times

use chrono::{DateTime, Local, Utc};

/// Placeholder shown when a time is unknown
pub const UNKNOWN: &str = "—";

/// Remaining time until a reset, e.g. `2h 5m 9s`.
///
/// `None` renders as [`UNKNOWN`], a reset that is due or past as
/// `Resetting…`. Hours above 99 drop the seconds.
pub fn format_countdown(ms: Option<i64>) -> String {
    let Some(ms) = ms else {
        return UNKNOWN.to_string();
    };
    if ms <= 0 {
        return "Resetting…".to_string();
    }

    let total_seconds = ms / 1000;
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;

    if h > 99 {
        format!("{}h {}m", h, m)
    } else if h > 0 {
        format!("{}h {}m {}s", h, m, s)
    } else {
        format!("{}m {}s", m, s)
    }
}

/// Short `MM:SS` clock for the time until the next poll
pub fn format_clock(ms: Option<i64>) -> String {
    match ms {
        Some(ms) if ms >= 0 => {
            let seconds = (ms + 999) / 1000;
            format!("{:02}:{:02}", seconds / 60, seconds % 60)
        }
        _ => "--:--".to_string(),
    }
}

/// Absolute reset time in the local zone
pub fn format_local_datetime(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.with_timezone(&Local).format("%b %d, %Y %H:%M:%S").to_string(),
        None => UNKNOWN.to_string(),
    }
}

/// Badge text for a tier
pub fn tier_badge(tier: quotawatch_core::Tier) -> String {
    tier.as_str().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quotawatch_core::Tier;

    #[test]
    fn test_countdown_placeholders() {
        assert_eq!(format_countdown(None), "—");
        assert_eq!(format_countdown(Some(0)), "Resetting…");
        assert_eq!(format_countdown(Some(-5_000)), "Resetting…");
    }

    #[test]
    fn test_countdown_units() {
        assert_eq!(format_countdown(Some(59_999)), "0m 59s");
        assert_eq!(format_countdown(Some(61_000)), "1m 1s");
        assert_eq!(format_countdown(Some((2 * 3600 + 5 * 60 + 9) * 1000)), "2h 5m 9s");
        assert_eq!(format_countdown(Some((99 * 3600 + 59 * 60 + 59) * 1000)), "99h 59m 59s");
        assert_eq!(format_countdown(Some((100 * 3600 + 30 * 60 + 10) * 1000)), "100h 30m");
    }

    #[test]
    fn test_clock_rounds_up() {
        assert_eq!(format_clock(None), "--:--");
        assert_eq!(format_clock(Some(-1)), "--:--");
        assert_eq!(format_clock(Some(0)), "00:00");
        assert_eq!(format_clock(Some(1)), "00:01");
        assert_eq!(format_clock(Some(29_001)), "00:30");
        assert_eq!(format_clock(Some(125_000)), "02:05");
    }

    #[test]
    fn test_local_datetime() {
        assert_eq!(format_local_datetime(None), "—");

        let at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let expected = at.with_timezone(&Local).format("%b %d, %Y %H:%M:%S").to_string();
        assert_eq!(format_local_datetime(Some(at)), expected);
    }

    #[test]
    fn test_tier_badge() {
        assert_eq!(tier_badge(Tier::Pro), "PRO");
        assert_eq!(tier_badge(Tier::Unknown), "UNKNOWN");
    }
}
