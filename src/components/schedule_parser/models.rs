use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use std::fmt;
use thiserror::Error;

/// One normalized shift, ready for title derivation and publishing
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftRecord {
    /// Person working the shift
    pub name: String,
    /// Shift start in the target timezone
    pub start: DateTime<Tz>,
    /// Shift end, always after `start`
    pub end: DateTime<Tz>,
    /// Duty role, e.g. "Proctor A" (empty for feeds without a role segment)
    pub role: String,
    /// Physical location
    pub location: String,
    /// Free text collected around the shift
    pub description: String,
}

/// Raw tabular schedule: date labels plus one row of cells per person
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleGrid {
    pub rows: Vec<Vec<String>>,
}

impl ScheduleGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Date labels from the header row, blanks removed
    pub fn date_labels(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|header| {
                header
                    .iter()
                    .skip(1)
                    .map(|label| label.trim())
                    .filter(|label| !label.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Why a single shift inside a cell could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShiftParseError {
    #[error("time range has no start/end pair: {0:?}")]
    MalformedTimeRange(String),

    #[error("invalid clock time: {0:?}")]
    InvalidClockTime(String),

    #[error("role line is not bullet separated: {0:?}")]
    MalformedRoleLine(String),

    #[error("local time does not exist in the target timezone: {0:?}")]
    NonexistentLocalTime(String),
}

/// A problem found while reading a schedule, kept next to the accepted shifts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseIssue {
    /// No "Scheduled shifts" row anywhere in the document
    MissingSection,
    /// A header label that is not a `YYYY-MM-DD` date
    InvalidDateLabel { label: String },
    /// A shift that was dropped
    MalformedShift {
        name: String,
        date: NaiveDate,
        line: String,
        error: ShiftParseError,
    },
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseIssue::MissingSection => write!(f, "could not find 'Scheduled shifts' section"),
            ParseIssue::InvalidDateLabel { label } => write!(f, "could not parse date: {}", label),
            ParseIssue::MalformedShift {
                name,
                date,
                line,
                error,
            } => write!(
                f,
                "error parsing shift for {} on {}: {} (line: {:?})",
                name, date, error, line
            ),
        }
    }
}

/// Accepted shifts plus everything that was skipped on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub shifts: Vec<ShiftRecord>,
    pub issues: Vec<ParseIssue>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
