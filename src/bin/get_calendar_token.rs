use reqwest::Client;
use shiftsync::components::google_calendar::auth::authorize;
use shiftsync::components::google_calendar::token::save_token;
use shiftsync::config::Config;
use shiftsync::error::SyncResult;

#[tokio::main]
async fn main() -> SyncResult<()> {
    tracing_subscriber::fmt().with_target(false).init();

    // Load configuration
    let config = Config::load()?;

    let token = authorize(&config, &Client::new()).await?;
    save_token(&config.token_path, &token)?;

    println!("Token saved to {}", config.token_path.display());
    if token.refresh_token.is_none() {
        println!("Warning: Google returned no refresh token, authorization will be needed again when this one expires.");
    }

    Ok(())
}
