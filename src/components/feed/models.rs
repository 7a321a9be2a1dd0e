use crate::components::batch::TaggedShift;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// One event read from the scheduling tool's calendar feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// `"<name> - <role> - <location>"`, role segment optional
    pub title: String,
    /// Start as published by the feed, before clock correction
    pub start: DateTime<Utc>,
    /// End as published by the feed, before clock correction
    pub end: DateTime<Utc>,
    /// Free text body
    pub description: String,
}

/// Name, role and location carried by a feed title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleParts {
    pub name: String,
    /// Empty unless the title has exactly three segments
    pub role: String,
    pub location: String,
}

/// Why a feed event could not become a shift
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedEntryError {
    #[error("event has no {0} property")]
    MissingProperty(&'static str),

    #[error("unsupported date/time in {0}")]
    InvalidDateTime(&'static str),

    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),

    #[error("title is not '<name> - <location>' shaped: {0:?}")]
    MalformedTitle(String),

    #[error("event ends before it starts")]
    InvalidRange,
}

/// Shifts accepted from a feed and the entries that were left out
#[derive(Debug, Clone, Default)]
pub struct FeedReport {
    pub shifts: Vec<TaggedShift>,
    /// Entries starting before the cutoff date
    pub skipped_before_cutoff: usize,
    /// Entries that could not be normalized, by title
    pub issues: Vec<(String, FeedEntryError)>,
}
