use chrono::NaiveDate;
use reqwest::Client;
use shiftsync::components::feed::{parse_feed, FeedNormalizer, FeedSource};
use shiftsync::components::shift_type::ShiftTypeStrategy;
use shiftsync::components::BatchSummary;
use shiftsync::config::Config;
use shiftsync::error::{config_error, SyncResult};
use std::path::PathBuf;
use std::sync::Arc;

pub struct FeedOptions {
    pub url: Option<String>,
    pub file: Option<PathBuf>,
    pub cutoff: Option<NaiveDate>,
    pub shift_type: Option<ShiftTypeStrategy>,
    pub dry_run: bool,
}

fn resolve_source(config: &Config, options: &FeedOptions) -> SyncResult<FeedSource> {
    if let Some(file) = &options.file {
        return Ok(FeedSource::File(file.clone()));
    }
    options
        .url
        .clone()
        .or_else(|| config.feed_url.clone())
        .map(FeedSource::Url)
        .ok_or_else(|| config_error("No feed given: pass --url or --file, or set FEED_URL"))
}

/// Fetch, normalize and publish the calendar feed
pub async fn import_feed(config: Arc<Config>, options: FeedOptions) -> SyncResult<BatchSummary> {
    let source = resolve_source(&config, &options)?;
    let content = source.load(&Client::new()).await?;
    let entries = parse_feed(&content)?;

    let mut normalizer = FeedNormalizer::new(&config).with_cutoff(options.cutoff);
    if let Some(strategy) = options.shift_type {
        normalizer = normalizer.with_strategy(strategy);
    }
    let report = normalizer.normalize_all(&entries);

    super::publish(config, &report.shifts, options.dry_run).await
}
