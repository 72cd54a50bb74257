//! Optional weekend pause for arXiv feeds.
//!
//! arXiv does not announce new papers on Saturdays or Sundays, so fetching
//! then only returns stale or empty feeds. When enabled, the feed path
//! serves the session's last good copy instead of hitting the network.
//! Weekends are judged in US Eastern time, daylight saving included.

use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Tz;

/// Shown alongside a feed served from the last good copy on a weekend.
pub const WEEKEND_NOTICE: &str =
    "Displaying cached data. Feed updates are paused during weekends.";

fn is_weekend_day(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Saturday or Sunday in US Eastern time.
pub fn is_weekend(now: DateTime<Utc>) -> bool {
    is_weekend_day(now.with_timezone(&New_York).weekday())
}

/// Midnight Eastern of the next weekday on or after today.
pub fn next_update(now: DateTime<Utc>) -> DateTime<Tz> {
    let mut day = now.with_timezone(&New_York).date_naive();
    while is_weekend_day(day.weekday()) {
        day = day + Days::new(1);
    }
    let midnight = day.and_time(NaiveTime::MIN);
    // New York changes offset at 02:00, so midnight always exists
    New_York
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| New_York.from_utc_datetime(&midnight))
}

/// e.g. "Monday, March 11 at 12:00 AM EDT"
pub fn format_next_update(when: &DateTime<Tz>) -> String {
    when.format("%A, %B %d at %I:%M %p %Z").to_string()
}

/// Whether weekend pausing applies to this session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekendPolicy {
    pub enabled: bool,
}

impl WeekendPolicy {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_paused(&self, now: DateTime<Utc>) -> bool {
        self.enabled && is_weekend(now)
    }
}
