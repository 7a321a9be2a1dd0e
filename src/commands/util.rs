use chrono::NaiveDate;
use dialoguer::Input;
use shiftsync::error::{other_error, SyncResult};
use shiftsync::utils::time::{date_from_parts, DATE_LABEL_FORMAT};

/// clap parser for `--cutoff`
pub fn parse_cutoff(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_LABEL_FORMAT)
        .map_err(|_| format!("expected YYYY-MM-DD, got {:?}", value))
}

/// Ask for month, day and year of the first shift to import
pub fn prompt_cutoff() -> SyncResult<NaiveDate> {
    println!("Only shifts on or after this date will be created.");

    let month: u32 = Input::new()
        .with_prompt("Month (1-12)")
        .validate_with(|m: &u32| {
            if (1..=12).contains(m) {
                Ok(())
            } else {
                Err("month must be 1-12")
            }
        })
        .interact_text()
        .map_err(|e| other_error(&format!("Failed to read month: {}", e)))?;
    let day: u32 = Input::new()
        .with_prompt("Day")
        .interact_text()
        .map_err(|e| other_error(&format!("Failed to read day: {}", e)))?;
    let year: i32 = Input::new()
        .with_prompt("Year")
        .interact_text()
        .map_err(|e| other_error(&format!("Failed to read year: {}", e)))?;

    date_from_parts(month, day, year)
        .ok_or_else(|| other_error(&format!("{}/{}/{} is not a valid date", month, day, year)))
}
