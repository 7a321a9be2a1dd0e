pub mod models;
pub mod normalize;
pub mod parse;

pub use models::{FeedEntry, FeedEntryError, FeedReport, TitleParts};
pub use normalize::{apply_clock_correction, split_title, FeedNormalizer};
pub use parse::parse_feed;

use crate::error::{feed_error, SyncResult};
use reqwest::Client;
use std::path::PathBuf;
use tracing::info;

/// Where a calendar feed is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

impl FeedSource {
    /// Fetch the raw feed document
    pub async fn load(&self, client: &Client) -> SyncResult<String> {
        match self {
            FeedSource::Url(url) => {
                info!("Fetching calendar feed from {}", url);
                let response = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| feed_error(&format!("Failed to fetch feed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Could not read error response".to_string());
                    return Err(feed_error(&format!(
                        "Failed to fetch feed: HTTP {} - {}",
                        status, error_body
                    )));
                }

                Ok(response.text().await?)
            }
            FeedSource::File(path) => {
                info!("Reading calendar feed from {}", path.display());
                Ok(tokio::fs::read_to_string(path).await?)
            }
        }
    }
}
