pub mod cell;
pub mod grid;
pub mod models;

pub use cell::CellScanner;
pub use grid::{parse_cell, parse_grid, parse_schedule, read_grid};
pub use models::{ParseIssue, ParseReport, ScheduleGrid, ShiftParseError, ShiftRecord};
