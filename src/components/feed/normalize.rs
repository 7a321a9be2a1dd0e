use super::models::{FeedEntry, FeedEntryError, FeedReport, TitleParts};
use crate::components::batch::TaggedShift;
use crate::components::schedule_parser::ShiftRecord;
use crate::components::shift_type::ShiftTypeStrategy;
use crate::config::Config;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

/// Separator between name, role and location in feed titles
pub const TITLE_SEPARATOR: &str = " - ";

/// Split a feed title into name, role and location
pub fn split_title(title: &str) -> Result<TitleParts, FeedEntryError> {
    let segments: Vec<&str> = title.split(TITLE_SEPARATOR).map(str::trim).collect();
    if segments.len() < 2 {
        return Err(FeedEntryError::MalformedTitle(title.to_string()));
    }

    let name = segments[0];
    let location = segments[segments.len() - 1];
    if name.is_empty() || location.is_empty() {
        return Err(FeedEntryError::MalformedTitle(title.to_string()));
    }

    let role = if segments.len() == 3 { segments[1] } else { "" };

    Ok(TitleParts {
        name: name.to_string(),
        role: role.to_string(),
        location: location.to_string(),
    })
}

/// Shift a feed instant by `hours` and express it in `tz`
pub fn apply_clock_correction(instant: DateTime<Utc>, hours: i64, tz: &Tz) -> DateTime<Tz> {
    (instant + Duration::hours(hours)).with_timezone(tz)
}

/// Turns feed entries into tagged shifts
#[derive(Debug, Clone)]
pub struct FeedNormalizer {
    tz: Tz,
    hour_offset: i64,
    strategy: ShiftTypeStrategy,
    cutoff: Option<NaiveDate>,
}

impl FeedNormalizer {
    pub fn new(config: &Config) -> Self {
        Self {
            tz: config.timezone,
            hour_offset: config.feed_hour_offset,
            strategy: config.feed_shift_type,
            cutoff: None,
        }
    }

    /// Drop entries whose corrected start date is before `cutoff`
    pub fn with_cutoff(mut self, cutoff: Option<NaiveDate>) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_strategy(mut self, strategy: ShiftTypeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Normalize one entry; `Ok(None)` means it falls before the cutoff
    pub fn normalize(&self, entry: &FeedEntry) -> Result<Option<TaggedShift>, FeedEntryError> {
        let parts = split_title(&entry.title)?;

        let start = apply_clock_correction(entry.start, self.hour_offset, &self.tz);
        let end = apply_clock_correction(entry.end, self.hour_offset, &self.tz);
        if end <= start {
            return Err(FeedEntryError::InvalidRange);
        }

        if let Some(cutoff) = self.cutoff {
            if start.date_naive() < cutoff {
                debug!("Skipping {} at {}: before cutoff {}", parts.name, start, cutoff);
                return Ok(None);
            }
        }

        let record = ShiftRecord {
            name: parts.name,
            start,
            end,
            role: parts.role,
            location: parts.location,
            description: entry.description.trim().to_string(),
        };
        let shift_type = self.strategy.classify(&record);

        Ok(Some(TaggedShift { record, shift_type }))
    }

    pub fn normalize_all(&self, entries: &[FeedEntry]) -> FeedReport {
        let mut report = FeedReport::default();

        for entry in entries {
            match self.normalize(entry) {
                Ok(Some(shift)) => report.shifts.push(shift),
                Ok(None) => report.skipped_before_cutoff += 1,
                Err(e) => {
                    warn!("Error reading feed event {:?} at {}: {}", entry.title, entry.start, e);
                    report.issues.push((entry.title.clone(), e));
                }
            }
        }

        info!(
            "Normalized {} feed shifts ({} before cutoff, {} unreadable)",
            report.shifts.len(),
            report.skipped_before_cutoff,
            report.issues.len()
        );
        report
    }
}
