mod feed;
mod schedule;
mod util;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use shiftsync::components::shift_type::ShiftTypeStrategy;
use shiftsync::components::{
    AttendeeDirectory, BatchRunner, BatchSummary, GoogleCalendarPublisher, TaggedShift,
};
use shiftsync::config::Config;
use shiftsync::error::SyncResult;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "shiftsync",
    version,
    about = "Publish shift schedules to a shared Google Calendar"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import a tabular schedule export (CSV)
    Csv {
        /// Path to the exported schedule
        path: PathBuf,

        /// Opening/closing detection: hours, keyword or none
        #[arg(long)]
        shift_type: Option<ShiftTypeStrategy>,

        /// List the events instead of creating them
        #[arg(long)]
        dry_run: bool,
    },

    /// Import the scheduling tool's calendar feed
    Feed {
        /// Feed URL, defaults to FEED_URL
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,

        /// Read the feed from a local .ics file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Skip shifts starting before this date (YYYY-MM-DD)
        #[arg(long, value_parser = util::parse_cutoff)]
        cutoff: Option<NaiveDate>,

        /// Ask for the cutoff date interactively
        #[arg(long, conflicts_with = "cutoff")]
        prompt_cutoff: bool,

        /// Opening/closing detection: hours, keyword or none
        #[arg(long)]
        shift_type: Option<ShiftTypeStrategy>,

        /// List the events instead of creating them
        #[arg(long)]
        dry_run: bool,
    },
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli, config: Arc<Config>) -> SyncResult<BatchSummary> {
    match cli.command {
        Command::Csv {
            path,
            shift_type,
            dry_run,
        } => schedule::import_schedule(config, &path, shift_type, dry_run).await,
        Command::Feed {
            url,
            file,
            cutoff,
            prompt_cutoff,
            shift_type,
            dry_run,
        } => {
            let cutoff = if prompt_cutoff {
                Some(util::prompt_cutoff()?)
            } else {
                cutoff
            };
            let options = feed::FeedOptions {
                url,
                file,
                cutoff,
                shift_type,
                dry_run,
            };
            feed::import_feed(config, options).await
        }
    }
}

/// Send tagged shifts to the calendar, or list them on a dry run
async fn publish(
    config: Arc<Config>,
    shifts: &[TaggedShift],
    dry_run: bool,
) -> SyncResult<BatchSummary> {
    let directory = AttendeeDirectory::load(&config.attendees_path)?
        .with_extra_attendees(config.extra_attendees.clone());

    if dry_run {
        info!("Dry run: {} shifts", shifts.len());
        return Ok(BatchRunner::dry_run(&directory, config.timezone)
            .run(shifts)
            .await);
    }

    let publisher = GoogleCalendarPublisher::new(Arc::clone(&config))?;
    publisher.ensure_authorized().await?;

    Ok(BatchRunner::new(&publisher, &directory, config.timezone)
        .run(shifts)
        .await)
}
