use crate::components::attendees::AttendeeDirectory;
use crate::components::google_calendar::{EventPublisher, NewCalendarEvent};
use crate::components::schedule_parser::ShiftRecord;
use crate::components::shift_type::{derive_title, ShiftType, ShiftTypeStrategy};
use chrono_tz::Tz;
use tracing::{error, info, warn};

/// A shift together with its opening/closing tag
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedShift {
    pub record: ShiftRecord,
    pub shift_type: Option<ShiftType>,
}

impl TaggedShift {
    pub fn classify(record: ShiftRecord, strategy: ShiftTypeStrategy) -> Self {
        let shift_type = strategy.classify(&record);
        Self { record, shift_type }
    }

    pub fn title(&self) -> String {
        derive_title(
            &self.record.role,
            &self.record.location,
            &self.record.name,
            self.shift_type,
        )
    }

    pub fn to_event(&self, attendees: Vec<String>, tz: &Tz) -> NewCalendarEvent {
        NewCalendarEvent {
            summary: self.title(),
            location: self.record.location.clone(),
            description: self.record.description.clone(),
            start: self.record.start,
            end: self.record.end,
            time_zone: tz.name().to_string(),
            attendees,
        }
    }
}

/// Outcome counts of one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub created: usize,
    /// No email known for the person
    pub skipped: usize,
    pub failed: usize,
}

/// Publishes shifts one by one.
///
/// Each shift is titled, matched to its attendees and sent before the next
/// one starts. Failures are logged and counted, never retried.
pub struct BatchRunner<'a> {
    publisher: Option<&'a dyn EventPublisher>,
    directory: &'a AttendeeDirectory,
    tz: Tz,
}

impl<'a> BatchRunner<'a> {
    pub fn new(publisher: &'a dyn EventPublisher, directory: &'a AttendeeDirectory, tz: Tz) -> Self {
        Self {
            publisher: Some(publisher),
            directory,
            tz,
        }
    }

    /// Runner that only reports what would be created
    pub fn dry_run(directory: &'a AttendeeDirectory, tz: Tz) -> Self {
        Self {
            publisher: None,
            directory,
            tz,
        }
    }

    pub async fn run(&self, shifts: &[TaggedShift]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for shift in shifts {
            let record = &shift.record;
            let title = shift.title();

            let Some(attendees) = self.directory.attendees_for(&record.name) else {
                warn!("No email found for {}, skipping {}", record.name, title);
                summary.skipped += 1;
                continue;
            };

            let event = shift.to_event(attendees, &self.tz);

            let Some(publisher) = self.publisher else {
                info!(
                    "Would create: {}  {} -> {}  [{}]",
                    title,
                    record.start.format("%Y-%m-%d %H:%M"),
                    record.end.format("%Y-%m-%d %H:%M"),
                    event.attendees.join(", ")
                );
                summary.created += 1;
                continue;
            };

            match publisher.create_event(&event).await {
                Ok(id) => {
                    info!("Created event: {} ({})", title, id);
                    summary.created += 1;
                }
                Err(e) => {
                    error!(
                        "Error creating event for {} at {}: {}",
                        record.name, record.start, e
                    );
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Batch finished: {} created, {} skipped, {} failed",
            summary.created, summary.skipped, summary.failed
        );
        summary
    }
}
