pub mod attendees;
pub mod batch;
pub mod feed;
pub mod google_calendar;
pub mod schedule_parser;
pub mod shift_type;

pub use attendees::AttendeeDirectory;
pub use batch::{BatchRunner, BatchSummary, TaggedShift};
pub use google_calendar::{EventPublisher, GoogleCalendarPublisher};
