use super::cell::CellScanner;
use super::models::{ParseIssue, ParseReport, ScheduleGrid};
use crate::error::SyncResult;
use crate::utils::time::parse_date_label;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::io::Read;
use tracing::{debug, info, warn};

/// Marker in the first column that precedes the per-person rows
pub const SECTION_MARKER: &str = "Scheduled shifts";

/// Read a comma-delimited export into a grid.
///
/// Rows may have any length and cells may span several lines when quoted.
pub fn read_grid<R: Read>(reader: R) -> SyncResult<ScheduleGrid> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(ScheduleGrid::new(rows))
}

/// Parse one person's cell for one day, logging every dropped shift
pub fn parse_cell(text: &str, date: NaiveDate, name: &str, tz: Tz) -> ParseReport {
    let mut report = ParseReport::default();

    for result in CellScanner::new(text, date, name, tz) {
        match result {
            Ok(shift) => {
                info!(
                    "  Found shift: {} at {} on {}",
                    shift.role, shift.location, date
                );
                report.shifts.push(shift);
            }
            Err(malformed) => {
                warn!(
                    "Error parsing shift for {} on {}: {}. Problematic line: {}",
                    name, date, malformed.error, malformed.line
                );
                report.issues.push(ParseIssue::MalformedShift {
                    name: name.to_string(),
                    date,
                    line: malformed.line,
                    error: malformed.error,
                });
            }
        }
    }

    report
}

/// Row index of the first per-person row, if the section marker exists
fn locate_section(grid: &ScheduleGrid) -> Option<usize> {
    grid.rows
        .iter()
        .position(|row| {
            row.first()
                .map(|first| first.contains(SECTION_MARKER))
                .unwrap_or(false)
        })
        .map(|marker| marker + 1)
}

/// Turn a whole grid into shift records.
///
/// Structural problems never fail the call: they are logged and listed in the
/// report's issues, and the affected rows or columns yield nothing.
pub fn parse_grid(grid: &ScheduleGrid, tz: Tz) -> ParseReport {
    let mut report = ParseReport::default();

    let Some(section_start) = locate_section(grid) else {
        warn!("Could not find '{}' section", SECTION_MARKER);
        report.issues.push(ParseIssue::MissingSection);
        return report;
    };

    let labels = grid.date_labels();
    let dates: Vec<Option<NaiveDate>> = labels
        .iter()
        .map(|label| {
            let date = parse_date_label(label);
            if date.is_none() {
                warn!("Could not parse date: {}", label);
                report.issues.push(ParseIssue::InvalidDateLabel {
                    label: label.clone(),
                });
            }
            date
        })
        .collect();
    debug!("Found {} date columns", dates.len());

    for row in &grid.rows[section_start..] {
        let name = match row.first().map(|name| name.trim()) {
            Some(name) if !name.is_empty() => name,
            _ => continue,
        };

        info!("Processing person: {}", name);

        for (cell, date) in row.iter().skip(1).zip(dates.iter()) {
            let Some(date) = date else {
                continue;
            };
            if cell.trim().is_empty() {
                continue;
            }

            let cell_report = parse_cell(cell, *date, name, tz);
            report.shifts.extend(cell_report.shifts);
            report.issues.extend(cell_report.issues);
        }
    }

    info!("Parsed {} shifts from schedule", report.shifts.len());
    report
}

/// Read and parse a comma-delimited export in one step
pub fn parse_schedule<R: Read>(reader: R, tz: Tz) -> SyncResult<ParseReport> {
    let grid = read_grid(reader)?;
    Ok(parse_grid(&grid, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::schedule_parser::models::ShiftRecord;
    use chrono::Timelike;
    use chrono_tz::America::Los_Angeles;

    const EXPORT: &str = "\
,2025-09-01,2025-09-02,2025-09-03
Coverage,,,
Open slots,2,1,0
Scheduled shifts,,,
Jane Doe,\"9:00 AM - 1:00 PM • 4h
Proctor A • Sutardja Dai 200
Opening shift\",Unavailable,\"11:00 PM - 1:00 AM • 2h
Proctor B • Doe Library\"
,,,
John Roe,\"All day
Unavailable\",\"8:00 AM - 12:00 PM • 4h
Unavailable
1:00 PM - 5:00 PM • 4h
Proctor C • Moffitt
Closing\",,extra cell
";

    fn shifts_for<'a>(report: &'a ParseReport, name: &str) -> Vec<&'a ShiftRecord> {
        report.shifts.iter().filter(|shift| shift.name == name).collect()
    }

    fn parse(text: &str) -> ParseReport {
        parse_schedule(text.as_bytes(), Los_Angeles).unwrap()
    }

    #[test]
    fn test_full_export() {
        let report = parse(EXPORT);
        assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
        assert_eq!(report.shifts.len(), 3);

        let jane = shifts_for(&report, "Jane Doe");
        assert_eq!(jane.len(), 2);
        assert_eq!(jane[0].role, "Proctor A");
        assert_eq!(jane[0].description, "Opening shift");
        assert_eq!(
            jane[0].start.date_naive(),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
        );
        assert_eq!(
            jane[1].end.date_naive(),
            NaiveDate::from_ymd_opt(2025, 9, 4).unwrap()
        );

        let john = shifts_for(&report, "John Roe");
        assert_eq!(john.len(), 1);
        assert_eq!(john[0].location, "Moffitt");
        assert_eq!(john[0].start.hour(), 13);
        assert_eq!(
            john[0].start.date_naive(),
            NaiveDate::from_ymd_opt(2025, 9, 2).unwrap()
        );
    }

    #[test]
    fn test_missing_section_marker() {
        let report = parse(",2025-09-01\nJane Doe,\"9:00 AM - 1:00 PM • 4h\nProctor A • Evans\"\n");
        assert!(report.shifts.is_empty());
        assert_eq!(report.issues, vec![ParseIssue::MissingSection]);
    }

    #[test]
    fn test_unparsable_date_column_is_skipped() {
        let report = parse(
            ",Monday,2025-09-02\n\
             Scheduled shifts,,\n\
             Jane Doe,\"9:00 AM - 1:00 PM • 4h\nProctor A • Evans\",\"9:00 AM - 1:00 PM • 4h\nProctor B • Soda\"\n",
        );
        assert_eq!(report.shifts.len(), 1);
        assert_eq!(report.shifts[0].role, "Proctor B");
        assert_eq!(
            report.issues,
            vec![ParseIssue::InvalidDateLabel {
                label: "Monday".to_string()
            }]
        );
    }

    #[test]
    fn test_blank_header_cells_are_dropped() {
        let grid = ScheduleGrid::new(vec![vec![
            "".to_string(),
            " 2025-09-01 ".to_string(),
            "".to_string(),
            "2025-09-02".to_string(),
        ]]);
        assert_eq!(grid.date_labels(), vec!["2025-09-01", "2025-09-02"]);
    }

    #[test]
    fn test_malformed_shift_is_reported_with_context() {
        let report = parse(
            ",2025-09-01\n\
             Scheduled shifts,\n\
             Jane Doe,\"9:00 AM - 25:00 PM • 4h\nProctor A • Evans\"\n",
        );
        assert!(report.shifts.is_empty());
        assert_eq!(report.issues.len(), 1);
        match &report.issues[0] {
            ParseIssue::MalformedShift {
                name, date, line, ..
            } => {
                assert_eq!(name, "Jane Doe");
                assert_eq!(*date, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
                assert_eq!(line, "9:00 AM - 25:00 PM • 4h");
            }
            other => panic!("unexpected issue: {:?}", other),
        }
    }

    #[test]
    fn test_empty_document() {
        let report = parse("");
        assert!(report.shifts.is_empty());
        assert_eq!(report.issues, vec![ParseIssue::MissingSection]);
    }
}
