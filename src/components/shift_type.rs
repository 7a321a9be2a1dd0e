use crate::components::schedule_parser::ShiftRecord;
use crate::error::{config_error, Error};
use chrono::Timelike;
use std::fmt;
use std::str::FromStr;

/// Hours added to feed instants before they are converted to local time.
///
/// The feed's timestamps arrive three hours early when read as published.
pub const FEED_CLOCK_CORRECTION_HOURS: i64 = 3;

/// Shifts starting at or before this local hour open the site
pub const OPENING_LAST_START_HOUR: u32 = 10;

/// Shifts ending at or after this local hour close the site
pub const CLOSING_FIRST_END_HOUR: u32 = 16;

/// Whether a shift opens or closes the site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftType {
    Opening,
    Closing,
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftType::Opening => write!(f, "Opening Shift"),
            ShiftType::Closing => write!(f, "Closing Shift"),
        }
    }
}

/// How a shift's opening/closing tag is derived.
///
/// `Hours` is tuned for the feed and `Keyword` for the tabular export, but
/// either works for either source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftTypeStrategy {
    /// Local start/end hour thresholds
    Hours,
    /// "opening"/"closing" appearing in the description
    Keyword,
    /// Never tag
    Disabled,
}

impl ShiftTypeStrategy {
    pub fn classify(&self, shift: &ShiftRecord) -> Option<ShiftType> {
        match self {
            ShiftTypeStrategy::Hours => classify_by_hours(shift.start.hour(), shift.end.hour()),
            ShiftTypeStrategy::Keyword => classify_by_keyword(&shift.description),
            ShiftTypeStrategy::Disabled => None,
        }
    }
}

impl FromStr for ShiftTypeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hours" => Ok(ShiftTypeStrategy::Hours),
            "keyword" => Ok(ShiftTypeStrategy::Keyword),
            "none" | "disabled" => Ok(ShiftTypeStrategy::Disabled),
            other => Err(config_error(&format!(
                "Unknown shift type strategy '{}' (expected hours, keyword or none)",
                other
            ))),
        }
    }
}

/// Tag from local start/end hours
pub fn classify_by_hours(start_hour: u32, end_hour: u32) -> Option<ShiftType> {
    if start_hour <= OPENING_LAST_START_HOUR {
        Some(ShiftType::Opening)
    } else if end_hour >= CLOSING_FIRST_END_HOUR {
        Some(ShiftType::Closing)
    } else {
        None
    }
}

/// Tag from the shift description. "closing" wins when both words appear.
pub fn classify_by_keyword(description: &str) -> Option<ShiftType> {
    let description = description.to_lowercase();
    if description.contains("closing") {
        Some(ShiftType::Closing)
    } else if description.contains("opening") {
        Some(ShiftType::Opening)
    } else {
        None
    }
}

/// Event title: `[LOCATION] Role - Name`, with ` - Opening Shift` style suffix
pub fn derive_title(role: &str, location: &str, name: &str, shift_type: Option<ShiftType>) -> String {
    let mut title = if role.is_empty() {
        format!("[{}] {}", location.to_uppercase(), name)
    } else {
        format!("[{}] {} - {}", location.to_uppercase(), role, name)
    };

    if let Some(shift_type) = shift_type {
        title.push_str(&format!(" - {}", shift_type));
    }

    title
}
