use shiftsync::components::schedule_parser::parse_schedule;
use shiftsync::components::shift_type::ShiftTypeStrategy;
use shiftsync::components::{BatchSummary, TaggedShift};
use shiftsync::config::Config;
use shiftsync::error::{schedule_error, SyncResult};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Parse a tabular export and publish its shifts
pub async fn import_schedule(
    config: Arc<Config>,
    path: &Path,
    shift_type: Option<ShiftTypeStrategy>,
    dry_run: bool,
) -> SyncResult<BatchSummary> {
    info!("Reading schedule export {}", path.display());
    let file = File::open(path)
        .map_err(|e| schedule_error(&format!("Failed to open {}: {}", path.display(), e)))?;

    let report = parse_schedule(file, config.timezone)?;
    if !report.is_clean() {
        warn!(
            "{} problem(s) while reading {}, affected shifts were skipped",
            report.issues.len(),
            path.display()
        );
    }

    let strategy = shift_type.unwrap_or(config.tabular_shift_type);
    let shifts: Vec<TaggedShift> = report
        .shifts
        .into_iter()
        .map(|record| TaggedShift::classify(record, strategy))
        .collect();

    super::publish(config, &shifts, dry_run).await
}
