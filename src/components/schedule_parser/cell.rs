use super::models::{ShiftParseError, ShiftRecord};
use crate::utils::time::{parse_clock_time, shift_bounds};
use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;
use std::mem;

/// Marker for blocks where the person cannot work
pub const UNAVAILABLE_MARKER: &str = "Unavailable";

/// Word that identifies a role/location line
pub const ROLE_MARKER: &str = "Proctor";

/// Bullet shared by time lines and role lines
pub const BULLET: char = '•';

/// Separator between role and location, and before the duration of a time line
pub const BULLET_SEPARATOR: &str = " • ";

/// Separator between start and end time
pub const RANGE_SEPARATOR: &str = " - ";

lazy_static! {
    static ref CLOCK_PREFIX: Regex = Regex::new(r"^\d+:\d+").unwrap();
}

/// A shift the scanner had to drop, with the line that caused it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedShift {
    pub line: String,
    pub error: ShiftParseError,
}

/// Whole-day unavailability: "Unavailable" or "All day" / "Unavailable"
pub fn is_entirely_unavailable(text: &str) -> bool {
    let lines: Vec<&str> = text
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    matches!(lines.as_slice(), ["Unavailable"] | ["All day", "Unavailable"])
}

/// Whether the line opens a new shift block
pub fn is_shift_time_line(line: &str) -> bool {
    CLOCK_PREFIX.is_match(line)
        && line.contains(RANGE_SEPARATOR)
        && line.contains(BULLET)
        && !line.contains(ROLE_MARKER)
}

/// Whether the line closes a lookahead window
fn ends_lookahead(line: &str) -> bool {
    CLOCK_PREFIX.is_match(line) || line.contains(UNAVAILABLE_MARKER)
}

/// Split "9:00 AM - 1:00 PM • 4h" into its start and end clock times
pub fn parse_time_range(line: &str) -> Result<(NaiveTime, NaiveTime), ShiftParseError> {
    let range = line.split(BULLET_SEPARATOR).next().unwrap_or(line);
    let parts: Vec<&str> = range.split(RANGE_SEPARATOR).collect();
    let [start_str, end_str] = parts.as_slice() else {
        return Err(ShiftParseError::MalformedTimeRange(line.to_string()));
    };

    let start = parse_clock_time(start_str)
        .ok_or_else(|| ShiftParseError::InvalidClockTime(start_str.trim().to_string()))?;
    let end = parse_clock_time(end_str)
        .ok_or_else(|| ShiftParseError::InvalidClockTime(end_str.trim().to_string()))?;

    Ok((start, end))
}

/// Split "Proctor A • Sutardja Dai 200" into role and location
pub fn parse_role_line(line: &str) -> Result<(String, String), ShiftParseError> {
    let parts: Vec<&str> = line.split(BULLET_SEPARATOR).collect();
    if parts.len() < 2 {
        return Err(ShiftParseError::MalformedRoleLine(line.to_string()));
    }
    Ok((parts[0].trim().to_string(), parts[1].trim().to_string()))
}

/// A block whose time line has been read and whose details are being collected
#[derive(Debug)]
struct PendingShift<'a> {
    time_line: &'a str,
    start: NaiveTime,
    end: NaiveTime,
    role: Option<String>,
    location: Option<String>,
    description: Vec<&'a str>,
    role_error: Option<ShiftParseError>,
}

#[derive(Debug)]
enum ScanState<'a> {
    SeekShift,
    InLookahead(PendingShift<'a>),
}

/// Lazily yields the shifts of one cell in top-to-bottom order.
///
/// A cell holds every block one person has on one day, for example:
///
/// ```text
/// 9:00 AM - 1:00 PM • 4h
/// Proctor A • Sutardja Dai 200
/// Opening shift, bring keys
/// Unavailable
/// 6:00 PM - 11:00 PM • 5h
/// ```
///
/// Time lines start a block. The lines after them, up to the next time line
/// or "Unavailable" marker, carry the role/location pair and a description.
/// Blocks without a role/location pair are idle time and produce nothing.
#[derive(Debug)]
pub struct CellScanner<'a> {
    lines: Vec<&'a str>,
    cursor: usize,
    state: ScanState<'a>,
    date: NaiveDate,
    name: &'a str,
    tz: Tz,
}

impl<'a> CellScanner<'a> {
    pub fn new(text: &'a str, date: NaiveDate, name: &'a str, tz: Tz) -> Self {
        let lines = if name.trim().is_empty() || is_entirely_unavailable(text) {
            Vec::new()
        } else {
            text.trim().lines().map(str::trim).collect()
        };

        Self {
            lines,
            cursor: 0,
            state: ScanState::SeekShift,
            date,
            name: name.trim(),
            tz,
        }
    }

    fn seek(&mut self, line: &'a str) -> Option<Result<ShiftRecord, MalformedShift>> {
        self.cursor += 1;

        if line.contains(UNAVAILABLE_MARKER) || !is_shift_time_line(line) {
            return None;
        }

        match parse_time_range(line) {
            Ok((start, end)) => {
                self.state = ScanState::InLookahead(PendingShift {
                    time_line: line,
                    start,
                    end,
                    role: None,
                    location: None,
                    description: Vec::new(),
                    role_error: None,
                });
                None
            }
            Err(error) => Some(Err(MalformedShift {
                line: line.to_string(),
                error,
            })),
        }
    }

    fn collect(pending: &mut PendingShift<'a>, line: &'a str) {
        if line.contains(ROLE_MARKER) && line.contains(BULLET) {
            match parse_role_line(line) {
                Ok((role, location)) => {
                    pending.role = Some(role);
                    pending.location = Some(location);
                }
                Err(error) => {
                    pending.role_error.get_or_insert(error);
                }
            }
        } else if !line.is_empty() {
            pending.description.push(line);
        }
    }

    fn finish(&self, pending: PendingShift<'a>) -> Option<Result<ShiftRecord, MalformedShift>> {
        let role = pending.role.filter(|role| !role.is_empty());
        let location = pending.location.filter(|location| !location.is_empty());

        let (role, location) = match (role, location, pending.role_error) {
            (Some(role), Some(location), _) => (role, location),
            (_, _, Some(error)) => {
                return Some(Err(MalformedShift {
                    line: pending.time_line.to_string(),
                    error,
                }))
            }
            // Idle time range, not a shift
            _ => return None,
        };

        let Some((start, end)) = shift_bounds(&self.tz, self.date, pending.start, pending.end)
        else {
            return Some(Err(MalformedShift {
                line: pending.time_line.to_string(),
                error: ShiftParseError::NonexistentLocalTime(pending.time_line.to_string()),
            }));
        };

        Some(Ok(ShiftRecord {
            name: self.name.to_string(),
            start,
            end,
            role,
            location,
            description: pending.description.join(" "),
        }))
    }
}

impl<'a> Iterator for CellScanner<'a> {
    type Item = Result<ShiftRecord, MalformedShift>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.get(self.cursor).copied();

            match mem::replace(&mut self.state, ScanState::SeekShift) {
                ScanState::SeekShift => {
                    let line = line?;
                    if let Some(item) = self.seek(line) {
                        return Some(item);
                    }
                }
                ScanState::InLookahead(mut pending) => match line {
                    Some(line) if !ends_lookahead(line) => {
                        Self::collect(&mut pending, line);
                        self.cursor += 1;
                        self.state = ScanState::InLookahead(pending);
                    }
                    // Boundary line is left for the next seek
                    _ => {
                        if let Some(item) = self.finish(pending) {
                            return Some(item);
                        }
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};
    use chrono_tz::America::Los_Angeles;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    fn scan(text: &str) -> Vec<Result<ShiftRecord, MalformedShift>> {
        CellScanner::new(text, day(), "Jane Doe", Los_Angeles).collect()
    }

    fn shifts(text: &str) -> Vec<ShiftRecord> {
        scan(text).into_iter().filter_map(Result::ok).collect()
    }

    #[test]
    fn test_unavailable_sentinels() {
        assert!(is_entirely_unavailable("Unavailable"));
        assert!(is_entirely_unavailable("  Unavailable \n"));
        assert!(is_entirely_unavailable("All day\nUnavailable"));
        assert!(is_entirely_unavailable("All day\r\nUnavailable"));
        assert!(!is_entirely_unavailable("9:00 AM - 1:00 PM • 4h\nUnavailable"));

        assert!(scan("Unavailable").is_empty());
        assert!(scan("All day\nUnavailable").is_empty());
        assert!(scan("").is_empty());
        assert!(scan("   \n  ").is_empty());
    }

    #[test]
    fn test_shift_time_line_detection() {
        assert!(is_shift_time_line("9:00 AM - 1:00 PM • 4h"));
        assert!(!is_shift_time_line("Proctor A • 9:00 - Lab"));
        assert!(!is_shift_time_line("9:00 AM - 1:00 PM"));
        assert!(!is_shift_time_line("Shift 9:00 AM - 1:00 PM • 4h"));
    }

    #[test]
    fn test_single_shift() {
        let records = shifts("9:00 AM - 1:00 PM • 4h\nProctor A • Sutardja Dai 200\nOpening shift");
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.role, "Proctor A");
        assert_eq!(record.location, "Sutardja Dai 200");
        assert_eq!(record.description, "Opening shift");
        assert_eq!(record.start.date_naive(), day());
        assert_eq!(record.start.hour(), 9);
        assert_eq!(record.end.hour(), 13);
        assert!(record.start < record.end);
    }

    #[test]
    fn test_description_lines_are_space_joined() {
        let records = shifts(
            "10:00 AM - 2:00 PM • 4h\nBring keys\nProctor B • Moffitt\nCheck the printers",
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "Bring keys Check the printers");
    }

    #[test]
    fn test_time_block_without_role_is_dropped() {
        assert!(scan("9:00 AM - 5:00 PM • 8h").is_empty());
        assert!(scan("9:00 AM - 5:00 PM • 8h\nDoctor appointment").is_empty());
        assert!(scan("9:00 AM - 5:00 PM • 8h\nUnavailable").is_empty());
    }

    #[test]
    fn test_midnight_crossing() {
        let records = shifts("11:00 PM - 1:00 AM • 2h\nProctor A • Doe Library");
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.start.hour(), 23);
        assert_eq!(record.end.date_naive(), day() + Duration::days(1));
        assert_eq!(record.end.hour(), 1);
        assert_eq!(record.end - record.start, Duration::hours(2));
    }

    #[test]
    fn test_multiple_blocks_in_order() {
        let text = "8:00 AM - 10:00 AM • 2h\n\
                    Proctor A • Sutardja Dai 200\n\
                    \n\
                    12:00 PM - 2:00 PM • 2h\n\
                    Unavailable\n\
                    3:00 PM - 6:00 PM • 3h\n\
                    Proctor B • Moffitt Library\n\
                    Closing";
        let records = shifts(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].role, "Proctor A");
        assert_eq!(records[0].start.hour(), 8);
        assert_eq!(records[1].role, "Proctor B");
        assert_eq!(records[1].location, "Moffitt Library");
        assert_eq!(records[1].description, "Closing");
        assert_eq!(records[1].start.hour(), 15);
    }

    #[test]
    fn test_lookahead_stops_at_next_time_line() {
        // Role belongs to the second block only
        let records = shifts("8:00 AM - 9:00 AM • 1h\n10:00 AM - 11:00 AM • 1h\nProctor C • Evans");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].start.hour(), 10);
    }

    #[test]
    fn test_malformed_time_does_not_stop_the_cell() {
        let results = scan(
            "9:00 XM - 1:00 PM • 4h\nProctor A • Evans\n2:00 PM - 4:00 PM • 2h\nProctor B • Soda",
        );
        assert_eq!(results.len(), 2);

        let failure = results[0].as_ref().unwrap_err();
        assert_eq!(failure.line, "9:00 XM - 1:00 PM • 4h");
        assert_eq!(
            failure.error,
            ShiftParseError::InvalidClockTime("9:00 XM".to_string())
        );

        let record = results[1].as_ref().unwrap();
        assert_eq!(record.role, "Proctor B");
        assert_eq!(record.start.hour(), 14);
    }

    #[test]
    fn test_time_range_with_extra_separator() {
        let results = scan("9:00 AM - 1:00 PM - 2:00 PM • 5h\nProctor A • Evans");
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].as_ref().unwrap_err().error,
            ShiftParseError::MalformedTimeRange(_)
        ));
    }

    #[test]
    fn test_malformed_role_line_is_reported() {
        let results = scan("9:00 AM - 1:00 PM • 4h\nProctor A•Evans");
        assert_eq!(results.len(), 1);
        let failure = results[0].as_ref().unwrap_err();
        assert_eq!(failure.line, "9:00 AM - 1:00 PM • 4h");
        assert!(matches!(failure.error, ShiftParseError::MalformedRoleLine(_)));
    }

    #[test]
    fn test_nonexistent_local_time_is_reported() {
        // 2:30 AM is skipped by the spring-forward transition
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let results: Vec<_> = CellScanner::new(
            "2:30 AM - 5:00 AM • 2h\nProctor A • Evans",
            date,
            "Jane Doe",
            Los_Angeles,
        )
        .collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0].as_ref().unwrap_err().error,
            ShiftParseError::NonexistentLocalTime(_)
        ));
    }

    #[test]
    fn test_parse_role_line() {
        assert_eq!(
            parse_role_line("Proctor A • Sutardja Dai 200").unwrap(),
            ("Proctor A".to_string(), "Sutardja Dai 200".to_string())
        );
        assert_eq!(
            parse_role_line("Proctor Lead • Moffitt • Floor 3").unwrap(),
            ("Proctor Lead".to_string(), "Moffitt".to_string())
        );
        assert!(parse_role_line("Proctor A").is_err());
    }
}
