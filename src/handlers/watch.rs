//! Handler for the `watch` command.

use super::GlobalOptions;
use super::report::{ReportOptions, emit};
use crate::error::Result;
use chrono::Local;
use crossterm::{cursor::MoveTo, execute, terminal};
use std::io::stdout;
use std::time::Duration;

fn clear_screen() -> Result<()> {
    let mut out = stdout();
    execute!(out, terminal::Clear(terminal::ClearType::All), MoveTo(0, 0))?;
    Ok(())
}

/// Re-run the report every `interval_secs` until Ctrl+C.
pub async fn handle_watch(
    globals: &GlobalOptions,
    options: ReportOptions,
    interval_secs: u64,
) -> Result<()> {
    let inspector = globals.inspector(options.filters.clone()).await?;
    let interval = Duration::from_secs(interval_secs.max(1));
    log::info!("Watching every {}s", interval.as_secs());

    loop {
        let report = tokio::select! {
            report = inspector.inspect() => report,
            signal = tokio::signal::ctrl_c() => return Ok(signal?),
        };

        if options.output.is_none() {
            clear_screen()?;
        }
        emit(&report, &options, globals.quiet)?;

        if !globals.quiet {
            println!("\nLast updated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
            println!("Watching for changes. Press Ctrl+C to exit...");
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            signal = tokio::signal::ctrl_c() => {
                signal?;
                log::debug!("Interrupted, stopping watch");
                return Ok(());
            }
        }
    }
}
