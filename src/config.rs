use crate::components::shift_type::{ShiftTypeStrategy, FEED_CLOCK_CORRECTION_HOURS};
use crate::error::{config_error, env_error, SyncResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Calendar used when `GOOGLE_CALENDAR_ID` is not set
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Main configuration structure, built once and handed to each component
#[derive(Debug, Clone)]
pub struct Config {
    /// Google Calendar API client ID
    pub google_client_id: String,
    /// Google Calendar API client secret
    pub google_client_secret: String,
    /// Calendar the shift events are created in
    pub google_calendar_id: String,
    /// Where the OAuth token is cached between runs
    pub token_path: PathBuf,
    /// Local port the OAuth redirect is received on
    pub oauth_redirect_port: u16,
    /// Timezone every shift is published in
    pub timezone: Tz,
    /// Remote iCalendar feed of the scheduling tool
    pub feed_url: Option<String>,
    /// TOML file mapping person names to emails
    pub attendees_path: PathBuf,
    /// Addresses invited to every event in addition to the shift owner
    pub extra_attendees: Vec<String>,
    /// Hours added to feed instants before conversion to `timezone`
    pub feed_hour_offset: i64,
    /// Opening/closing detection used for tabular imports
    pub tabular_shift_type: ShiftTypeStrategy,
    /// Opening/closing detection used for feed imports
    pub feed_shift_type: ShiftTypeStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_client_id: String::new(),
            google_client_secret: String::new(),
            google_calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            token_path: PathBuf::from("token.json"),
            oauth_redirect_port: 8080,
            timezone: chrono_tz::America::Los_Angeles,
            feed_url: None,
            attendees_path: PathBuf::from("config/attendees.toml"),
            extra_attendees: Vec::new(),
            feed_hour_offset: FEED_CLOCK_CORRECTION_HOURS,
            tabular_shift_type: ShiftTypeStrategy::Keyword,
            feed_shift_type: ShiftTypeStrategy::Hours,
        }
    }
}

impl Config {
    /// Load configuration from the environment (and `.env` if present)
    pub fn load() -> SyncResult<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timezone = match get("TIMEZONE") {
            Some(name) => name
                .trim()
                .parse::<Tz>()
                .map_err(|_| config_error(&format!("Unknown timezone: {}", name)))?,
            None => defaults.timezone,
        };

        let oauth_redirect_port = match get("OAUTH_REDIRECT_PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|_| config_error("Invalid OAUTH_REDIRECT_PORT format"))?,
            None => defaults.oauth_redirect_port,
        };

        let feed_hour_offset = match get("FEED_HOUR_OFFSET") {
            Some(offset) => offset
                .trim()
                .parse::<i64>()
                .map_err(|_| config_error("Invalid FEED_HOUR_OFFSET format"))?,
            None => defaults.feed_hour_offset,
        };

        let tabular_shift_type = match get("TABULAR_SHIFT_TYPE") {
            Some(value) => value.parse()?,
            None => defaults.tabular_shift_type,
        };

        let feed_shift_type = match get("FEED_SHIFT_TYPE") {
            Some(value) => value.parse()?,
            None => defaults.feed_shift_type,
        };

        let extra_attendees = get("EXTRA_ATTENDEES")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|email| !email.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            google_client_id: get("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_client_secret: get("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            google_calendar_id: get("GOOGLE_CALENDAR_ID").unwrap_or(defaults.google_calendar_id),
            token_path: get("TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_path),
            oauth_redirect_port,
            timezone,
            feed_url: get("FEED_URL"),
            attendees_path: get("ATTENDEES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.attendees_path),
            extra_attendees,
            feed_hour_offset,
            tabular_shift_type,
            feed_shift_type,
        })
    }

    /// Redirect URI registered for the OAuth consent flow
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}", self.oauth_redirect_port)
    }

    /// Fail unless OAuth client credentials are present
    pub fn require_google_credentials(&self) -> SyncResult<()> {
        if self.google_client_id.is_empty() {
            return Err(env_error("GOOGLE_CLIENT_ID"));
        }
        if self.google_client_secret.is_empty() {
            return Err(env_error("GOOGLE_CLIENT_SECRET"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.google_calendar_id, "primary");
        assert_eq!(config.timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(config.feed_hour_offset, 3);
        assert_eq!(config.tabular_shift_type, ShiftTypeStrategy::Keyword);
        assert_eq!(config.feed_shift_type, ShiftTypeStrategy::Hours);
        assert!(config.extra_attendees.is_empty());
        assert_eq!(config.redirect_uri(), "http://localhost:8080");
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_CALENDAR_ID", "shared@group.calendar.google.com"),
            ("TIMEZONE", "Europe/Helsinki"),
            ("FEED_HOUR_OFFSET", "-2"),
            ("FEED_SHIFT_TYPE", "keyword"),
            ("EXTRA_ATTENDEES", "lead@example.com, ,ops@example.com"),
            ("OAUTH_REDIRECT_PORT", "9090"),
        ]))
        .unwrap();

        assert_eq!(config.google_calendar_id, "shared@group.calendar.google.com");
        assert_eq!(config.timezone, chrono_tz::Europe::Helsinki);
        assert_eq!(config.feed_hour_offset, -2);
        assert_eq!(config.feed_shift_type, ShiftTypeStrategy::Keyword);
        assert_eq!(
            config.extra_attendees,
            vec!["lead@example.com".to_string(), "ops@example.com".to_string()]
        );
        assert_eq!(config.redirect_uri(), "http://localhost:9090");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("TIMEZONE", "Mars/Olympus")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("FEED_HOUR_OFFSET", "three")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("FEED_SHIFT_TYPE", "moon")])).is_err());
    }

    #[test]
    fn test_require_google_credentials() {
        let mut config = Config::default();
        assert!(config.require_google_credentials().is_err());
        config.google_client_id = "id".to_string();
        config.google_client_secret = "secret".to_string();
        assert!(config.require_google_credentials().is_ok());
    }
}
