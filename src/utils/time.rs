use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Date label format used by the tabular export
pub const DATE_LABEL_FORMAT: &str = "%Y-%m-%d";

/// Twelve-hour clock format used in shift lines ("1:00 PM")
pub const CLOCK_FORMAT: &str = "%I:%M %p";

/// Parse a twelve-hour clock time such as "12:00 AM" or "1:30 PM"
pub fn parse_clock_time(time_str: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time_str.trim(), CLOCK_FORMAT).ok()
}

/// Parse a `YYYY-MM-DD` column label
pub fn parse_date_label(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    // chrono accepts unpadded fields, the export never produces them
    if label.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(label, DATE_LABEL_FORMAT).ok()
}

/// Build a calendar date from month/day/year answers
pub fn date_from_parts(month: u32, day: u32, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Attach `tz` to a wall-clock time.
///
/// Ambiguous times (the repeated hour when clocks fall back) resolve to the
/// earlier instant; times skipped by a spring-forward gap return `None`.
pub fn localize(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(naive) {
        chrono::LocalResult::Single(dt) => Some(dt),
        chrono::LocalResult::Ambiguous(earliest, _) => Some(earliest),
        chrono::LocalResult::None => None,
    }
}

/// Combine a date with a start and end clock time.
///
/// An end at or before the start is read as crossing midnight and lands on
/// the following day.
pub fn shift_bounds(
    tz: &Tz,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
    let start_naive = date.and_time(start);
    let mut end_naive = date.and_time(end);
    if end <= start {
        end_naive = end_naive.checked_add_signed(Duration::days(1))?;
    }

    Some((localize(tz, &start_naive)?, localize(tz, &end_naive)?))
}
