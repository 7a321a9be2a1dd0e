use chrono::{DateTime, SecondsFormat};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Everything needed to create one shift event
#[derive(Debug, Clone, PartialEq)]
pub struct NewCalendarEvent {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    /// IANA name sent alongside both instants
    pub time_zone: String,
    pub attendees: Vec<String>,
}

impl NewCalendarEvent {
    /// Request body for the `events.insert` endpoint
    pub fn to_google_body(&self) -> GoogleEventBody {
        GoogleEventBody {
            summary: self.summary.clone(),
            location: self.location.clone(),
            description: self.description.clone(),
            start: GoogleEventTime {
                date_time: self.start.to_rfc3339_opts(SecondsFormat::Secs, false),
                time_zone: self.time_zone.clone(),
            },
            end: GoogleEventTime {
                date_time: self.end.to_rfc3339_opts(SecondsFormat::Secs, false),
                time_zone: self.time_zone.clone(),
            },
            attendees: self
                .attendees
                .iter()
                .map(|email| GoogleAttendee {
                    email: email.clone(),
                })
                .collect(),
            reminders: GoogleReminders { use_default: true },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventBody {
    pub summary: String,
    pub location: String,
    pub description: String,
    pub start: GoogleEventTime,
    pub end: GoogleEventTime,
    pub attendees: Vec<GoogleAttendee>,
    pub reminders: GoogleReminders,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleAttendee {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleReminders {
    pub use_default: bool,
}

/// The part of the created event we keep
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub id: String,
    pub html_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Los_Angeles;
    use serde_json::json;

    #[test]
    fn test_google_body_shape() {
        let event = NewCalendarEvent {
            summary: "[EVANS] Proctor A - Jane Doe".to_string(),
            location: "Evans".to_string(),
            description: "Opening shift".to_string(),
            start: Los_Angeles.with_ymd_and_hms(2025, 9, 1, 9, 0, 0).unwrap(),
            end: Los_Angeles.with_ymd_and_hms(2025, 9, 1, 13, 0, 0).unwrap(),
            time_zone: "America/Los_Angeles".to_string(),
            attendees: vec!["jane@example.com".to_string()],
        };

        let body = serde_json::to_value(event.to_google_body()).unwrap();
        assert_eq!(
            body,
            json!({
                "summary": "[EVANS] Proctor A - Jane Doe",
                "location": "Evans",
                "description": "Opening shift",
                "start": {"dateTime": "2025-09-01T09:00:00-07:00", "timeZone": "America/Los_Angeles"},
                "end": {"dateTime": "2025-09-01T13:00:00-07:00", "timeZone": "America/Los_Angeles"},
                "attendees": [{"email": "jane@example.com"}],
                "reminders": {"useDefault": true}
            })
        );
    }
}
