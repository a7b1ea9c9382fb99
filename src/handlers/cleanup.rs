//! Handler for the `cleanup` command.

use super::GlobalOptions;
use crate::analyzer::storage::{PresenterOptions, StorageReport, format_cleanup};
use crate::cli::FilterArgs;
use crate::error::Result;

/// Count line printed to stderr; `None` when quiet.
fn status_line(report: &StorageReport, quiet: bool) -> Option<String> {
    if quiet {
        return None;
    }
    Some(format!(
        "{} of {} volumes are safe to delete",
        report.deletion_candidates.len(),
        report.summary.volumes
    ))
}

/// Print only the volumes that are safe to delete and how to delete them.
///
/// Nothing is deleted; the commands are for the operator to review and run.
pub async fn handle_cleanup(globals: &GlobalOptions, filters: FilterArgs) -> Result<()> {
    let inspector = globals.inspector(filters.into_filters()).await?;
    let report = inspector.inspect().await;

    if let Some(line) = status_line(&report, globals.quiet) {
        log::info!("{}", line);
        eprintln!("{}", line);
    }

    let options = PresenterOptions {
        color: globals.color,
        ..PresenterOptions::default()
    };
    print!("{}", format_cleanup(&report, &options));
    Ok(())
}
