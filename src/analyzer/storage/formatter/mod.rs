//! Output formatting for storage reports.
//!
//! Supports multiple output formats: table, JSON, YAML, and plain summary.
//! Presentation toggles travel in [`PresenterOptions`]; nothing here reads
//! process-wide state.

mod output;
mod sections;

pub use output::{
    OutputFormat, PresenterOptions, format_cleanup, format_report, format_report_to_string,
};
