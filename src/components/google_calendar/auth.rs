use super::token::{StoredToken, TokenResponse};
use crate::config::Config;
use crate::error::{google_calendar_error, other_error, SyncResult};
use reqwest::Client;
use tracing::{info, warn};
use url::Url;

pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scope needed to insert events and invite attendees
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

/// Consent page URL for the installed-app flow
pub fn authorization_url(config: &Config, state: &str) -> SyncResult<Url> {
    let mut url = Url::parse(AUTH_URL)
        .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("client_id", &config.google_client_id)
        .append_pair("redirect_uri", &config.redirect_uri())
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", CALENDAR_SCOPE)
        .append_pair("state", state);

    Ok(url)
}

/// Pull the authorization code out of the redirect request path
pub fn extract_code(request_path: &str, expected_state: &str) -> SyncResult<String> {
    let url = Url::parse(&format!("http://localhost{}", request_path))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Err(google_calendar_error(&format!(
                    "Authorization was denied: {}",
                    value
                )))
            }
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(google_calendar_error("Authorization callback state mismatch"));
    }

    code.ok_or_else(|| other_error("No authorization code found in callback"))
}

/// Run the interactive consent flow and return a fresh token.
///
/// Opens the browser and blocks until Google redirects back to the local
/// listener on `config.oauth_redirect_port`.
pub async fn authorize(config: &Config, client: &Client) -> SyncResult<StoredToken> {
    config.require_google_credentials()?;

    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = authorization_url(config, &state)?;

    let server = tiny_http::Server::http(("127.0.0.1", config.oauth_redirect_port))
        .map_err(|e| other_error(&format!("Failed to start callback listener: {}", e)))?;

    info!("Opening browser for Google Calendar authorization...");
    if let Err(e) = webbrowser::open(auth_url.as_str()) {
        warn!("Could not open browser: {}", e);
        warn!("Open this URL to authorize: {}", auth_url);
    }
    info!("Waiting for authorization callback...");

    let code = tokio::task::spawn_blocking(move || -> SyncResult<String> {
        let request = server.recv()?;
        let code = extract_code(request.url(), &state);

        let message = match &code {
            Ok(_) => "Authorization successful! You can close this window.",
            Err(_) => "Authorization failed. Check the terminal for details.",
        };
        request.respond(tiny_http::Response::from_string(message))?;

        code
    })
    .await
    .map_err(|e| other_error(&format!("Callback listener failed: {}", e)))??;

    let token = exchange_code(config, client, &code).await?;
    info!("Google Calendar authorization complete");
    Ok(token)
}

/// Exchange an authorization code for tokens
pub async fn exchange_code(config: &Config, client: &Client, code: &str) -> SyncResult<StoredToken> {
    let redirect_uri = config.redirect_uri();
    let params = [
        ("client_id", config.google_client_id.as_str()),
        ("client_secret", config.google_client_secret.as_str()),
        ("code", code),
        ("redirect_uri", redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
    ];

    let response = client.post(TOKEN_URL).form(&params).send().await?;

    if !response.status().is_success() {
        let error_text = response.text().await?;
        return Err(google_calendar_error(&format!(
            "Failed to get token: {}",
            error_text
        )));
    }

    let token: TokenResponse = response.json().await?;
    Ok(token.into_stored(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url() {
        let config = Config {
            google_client_id: "client-123".to_string(),
            ..Config::default()
        };
        let url = authorization_url(&config, "abc").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(url.as_str().starts_with(AUTH_URL));
        assert!(pairs.contains(&("client_id".to_string(), "client-123".to_string())));
        assert!(pairs.contains(&("redirect_uri".to_string(), "http://localhost:8080".to_string())));
        assert!(pairs.contains(&("scope".to_string(), CALENDAR_SCOPE.to_string())));
        assert!(pairs.contains(&("state".to_string(), "abc".to_string())));
    }

    #[test]
    fn test_extract_code() {
        assert_eq!(
            extract_code("/?state=abc&code=4%2F0Ab", "abc").unwrap(),
            "4/0Ab"
        );
        assert!(extract_code("/?state=other&code=x", "abc").is_err());
        assert!(extract_code("/?state=abc", "abc").is_err());
        assert!(extract_code("/?error=access_denied&state=abc", "abc").is_err());
    }
}
