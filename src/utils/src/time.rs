use chrono::format::StrftimeItems;
use chrono::{DateTime, NaiveDateTime};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// current timestamp
pub fn now() -> Duration {
    // A clock set before the epoch reads as the epoch itself.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// now_secs returns the current unix time in whole seconds.
pub fn now_secs() -> u64 {
    now().as_secs()
}

pub fn unix_secs_to_time(unix_secs: u64) -> Option<NaiveDateTime> {
    let secs = i64::try_from(unix_secs).ok()?;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

pub fn time_format(dt: NaiveDateTime) -> String {
    let fmt = StrftimeItems::new("%Y-%m-%d %H:%M:%S");
    format!("{}", dt.format_with_items(fmt))
}

#[cfg(test)]
mod tests {
    use crate::time::{now_secs, time_format, unix_secs_to_time};

    #[test]
    fn test_time_format() {
        // 27th of April 2025, 12:10:10 UTC
        let dt = unix_secs_to_time(1745755810).unwrap();
        assert_eq!(time_format(dt), "2025-04-27 12:10:10");
    }

    #[test]
    fn test_out_of_range() {
        assert!(unix_secs_to_time(u64::MAX).is_none());
    }

    #[test]
    fn test_now_after_epoch() {
        assert!(now_secs() > 1_600_000_000);
    }
}
