use super::models::{FeedEntry, FeedEntryError};
use crate::error::{feed_error, SyncResult};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    parser::{read_calendar, unfold, Component},
    CalendarDateTime, DatePerhapsTime,
};
use tracing::{debug, warn};

/// Parse every event of a feed document.
///
/// A document that is not iCalendar at all is an error; individual events
/// that cannot be read are logged and left out.
pub fn parse_feed(content: &str) -> SyncResult<Vec<FeedEntry>> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded)
        .map_err(|e| feed_error(&format!("Failed to parse calendar feed: {}", e)))?;

    let entries: Vec<FeedEntry> = calendar
        .components
        .iter()
        .filter(|component| component.name == "VEVENT")
        .filter_map(|vevent| match entry_from_component(vevent) {
            Ok(entry) => Some(entry),
            Err(e) => {
                let summary = vevent
                    .find_prop("SUMMARY")
                    .map(|p| p.val.to_string())
                    .unwrap_or_default();
                warn!("Skipping feed event {:?}: {}", summary, e);
                None
            }
        })
        .collect();

    debug!("Read {} events from feed", entries.len());
    Ok(entries)
}

fn entry_from_component(vevent: &Component<'_>) -> Result<FeedEntry, FeedEntryError> {
    let title = vevent
        .find_prop("SUMMARY")
        .map(|p| unescape_text(p.val.as_ref()))
        .ok_or(FeedEntryError::MissingProperty("SUMMARY"))?;

    let start = vevent
        .find_prop("DTSTART")
        .ok_or(FeedEntryError::MissingProperty("DTSTART"))?;
    let start = DatePerhapsTime::try_from(start)
        .map_err(|_| FeedEntryError::InvalidDateTime("DTSTART"))
        .and_then(|dpt| to_utc(dpt, "DTSTART"))?;

    let end = match (vevent.find_prop("DTEND"), vevent.find_prop("DURATION")) {
        (Some(end), _) => DatePerhapsTime::try_from(end)
            .map_err(|_| FeedEntryError::InvalidDateTime("DTEND"))
            .and_then(|dpt| to_utc(dpt, "DTEND"))?,
        (None, Some(duration)) => start + parse_duration(duration.val.as_ref())?,
        (None, None) => return Err(FeedEntryError::MissingProperty("DTEND")),
    };

    let description = vevent
        .find_prop("DESCRIPTION")
        .map(|p| unescape_text(p.val.as_ref()))
        .unwrap_or_default();

    Ok(FeedEntry {
        title,
        start,
        end,
        description,
    })
}

/// Read a feed time as a UTC instant.
///
/// Floating times are taken as UTC, as the feed publishes them that way.
fn to_utc(dpt: DatePerhapsTime, property: &'static str) -> Result<DateTime<Utc>, FeedEntryError> {
    match dpt {
        DatePerhapsTime::Date(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or(FeedEntryError::InvalidDateTime(property)),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Ok(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            Ok(Utc.from_utc_datetime(&naive))
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            zoned_to_utc(&date_time, &tzid, property)
        }
    }
}

fn zoned_to_utc(
    date_time: &NaiveDateTime,
    tzid: &str,
    property: &'static str,
) -> Result<DateTime<Utc>, FeedEntryError> {
    let tz: Tz = tzid
        .parse()
        .map_err(|_| FeedEntryError::UnknownTimezone(tzid.to_string()))?;

    match tz.from_local_datetime(date_time) {
        chrono::LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        chrono::LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        chrono::LocalResult::None => Err(FeedEntryError::InvalidDateTime(property)),
    }
}

/// Read a `DURATION` value such as `PT4H` or `P1D`. Negative durations are rejected.
fn parse_duration(value: &str) -> Result<Duration, FeedEntryError> {
    let value = value.trim();
    let value = value.strip_prefix('+').unwrap_or(value);

    let duration =
        iso8601::duration(value).map_err(|_| FeedEntryError::InvalidDateTime("DURATION"))?;
    let std_duration: std::time::Duration = duration.into();
    Duration::from_std(std_duration).map_err(|_| FeedEntryError::InvalidDateTime("DURATION"))
}

/// Undo iCalendar TEXT escaping (`\n`, `\,`, `\;`, `\\`)
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const FEED: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//Scheduling//Shifts//EN\r
BEGIN:VEVENT\r
UID:shift-1\r
SUMMARY:Jane Doe - Proctor A - Sutardja Dai 200\r
DTSTART:20250901T130000Z\r
DTEND:20250901T170000Z\r
DESCRIPTION:Opening shift\\, bring keys\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:shift-2\r
SUMMARY:John Roe - Front Desk\r
DTSTART;TZID=America/Los_Angeles:20250902T150000\r
DTEND;TZID=America/Los_Angeles:20250902T200000\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:broken\r
SUMMARY:No times\r
END:VEVENT\r
END:VCALENDAR\r
";

    #[test]
    fn test_parse_feed() {
        let entries = parse_feed(FEED).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].title, "Jane Doe - Proctor A - Sutardja Dai 200");
        assert_eq!(entries[0].start.hour(), 13);
        assert_eq!(entries[0].end.hour(), 17);
        assert_eq!(entries[0].description, "Opening shift, bring keys");

        assert_eq!(entries[1].title, "John Roe - Front Desk");
        // 15:00 PDT
        assert_eq!(entries[1].start.hour(), 22);
        assert!(entries[1].description.is_empty());
    }

    #[test]
    fn test_duration_stands_in_for_missing_end() {
        let feed = "BEGIN:VCALENDAR\r
VERSION:2.0\r
BEGIN:VEVENT\r
UID:shift-3\r
SUMMARY:Jane Doe - Proctor A - Moffitt\r
DTSTART:20250901T130000Z\r
DURATION:PT4H\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:shift-4\r
SUMMARY:John Roe - Front Desk\r
DTSTART:20250902T130000Z\r
DURATION:P1D\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:no-end\r
SUMMARY:John Roe - Front Desk\r
DTSTART:20250903T130000Z\r
END:VEVENT\r
END:VCALENDAR\r
";
        let entries = parse_feed(feed).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].end - entries[0].start, Duration::hours(4));
        assert_eq!(entries[0].end.hour(), 17);
        assert_eq!(entries[1].end - entries[1].start, Duration::days(1));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("PT4H"), Ok(Duration::hours(4)));
        assert_eq!(parse_duration("+PT1H30M"), Ok(Duration::minutes(90)));
        assert_eq!(parse_duration("P1W"), Ok(Duration::weeks(1)));
        assert_eq!(
            parse_duration("four hours"),
            Err(FeedEntryError::InvalidDateTime("DURATION"))
        );
    }

    #[test]
    fn test_unescape_text() {
        assert_eq!(unescape_text("a\\nb"), "a\nb");
        assert_eq!(unescape_text("a\\, b\\; c\\\\"), "a, b; c\\");
        assert_eq!(unescape_text("plain"), "plain");
    }
}
