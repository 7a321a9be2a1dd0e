use super::models::{CreatedEvent, NewCalendarEvent};
use super::token::TokenManager;
use crate::config::Config;
use crate::error::{google_calendar_error, SyncResult};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;
use url::Url;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// Anything that can create a calendar event for a shift
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Create the event and return its remote id
    async fn create_event(&self, event: &NewCalendarEvent) -> SyncResult<String>;
}

/// Publishes shift events into a Google Calendar, inviting attendees by email
pub struct GoogleCalendarPublisher {
    calendar_id: String,
    token_manager: TokenManager,
    client: Client,
}

impl GoogleCalendarPublisher {
    pub fn new(config: Arc<Config>) -> SyncResult<Self> {
        config.require_google_credentials()?;

        let client = Client::new();
        Ok(Self {
            calendar_id: config.google_calendar_id.clone(),
            token_manager: TokenManager::new(Arc::clone(&config), client.clone()),
            client,
        })
    }

    /// Make sure a usable token exists before the batch starts
    pub async fn ensure_authorized(&self) -> SyncResult<()> {
        self.token_manager.get_token().await.map(|_| ())
    }

    fn events_url(&self) -> SyncResult<Url> {
        let mut url = Url::parse(CALENDAR_API_BASE)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Calendar API URL cannot be a base"))?
            .push(&self.calendar_id)
            .push("events");
        url.query_pairs_mut().append_pair("sendUpdates", "all");
        Ok(url)
    }
}

#[async_trait]
impl EventPublisher for GoogleCalendarPublisher {
    async fn create_event(&self, event: &NewCalendarEvent) -> SyncResult<String> {
        let access_token = self.token_manager.get_token().await?;
        let url = self.events_url()?;

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(&event.to_google_body())
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to create event: HTTP {} - {}",
                status, error_body
            )));
        }

        let created: CreatedEvent = response.json().await.map_err(|e| {
            google_calendar_error(&format!("Failed to parse event response: {}", e))
        })?;
        debug!("Created event {} ({:?})", created.id, created.html_link);

        Ok(created.id)
    }
}
