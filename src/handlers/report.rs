//! Handler for the `report` command.

use super::GlobalOptions;
use crate::analyzer::storage::{
    OutputFormat, PresenterOptions, StorageFilters, StorageReport, format_report_to_string,
};
use crate::cli::{FilterArgs, OutputArgs};
use crate::config::types::Config;
use crate::error::{ConfigError, Result};
use std::path::PathBuf;

/// Configuration for the report and watch commands
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub filters: StorageFilters,
    pub format: OutputFormat,
    pub presenter: PresenterOptions,
    /// Write here instead of stdout
    pub output: Option<PathBuf>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            filters: StorageFilters::default(),
            format: OutputFormat::Table,
            presenter: PresenterOptions::default(),
            output: None,
        }
    }
}

impl ReportOptions {
    /// Merge command flags over the `[output]` section of the config file.
    pub fn resolve(
        globals: &GlobalOptions,
        config: &Config,
        filters: FilterArgs,
        output: OutputArgs,
    ) -> Result<Self> {
        let format = match output.format {
            Some(format) => format.into(),
            None => OutputFormat::parse(&config.output.format).ok_or_else(|| {
                ConfigError::Invalid(format!("unknown output format '{}'", config.output.format))
            })?,
        };

        Ok(Self {
            filters: filters.into_filters(),
            format,
            presenter: PresenterOptions {
                color: globals.color,
                compact: output.compact || config.output.compact,
                detailed: output.detailed || config.output.detailed,
                show_replicas: config.output.show_replicas && !output.no_replicas,
                show_relationships: config.output.show_relationships && !output.no_relationships,
            },
            output: output.output,
        })
    }
}

/// Render a report the way the options ask for.
pub fn render_report(report: &StorageReport, options: &ReportOptions) -> String {
    format_report_to_string(report, options.format, &options.presenter)
}

/// Print the report, or write it uncoloured to the output file.
pub(crate) fn emit(report: &StorageReport, options: &ReportOptions, quiet: bool) -> Result<()> {
    match &options.output {
        Some(path) => {
            let plain = ReportOptions {
                presenter: options.presenter.plain(),
                ..options.clone()
            };
            std::fs::write(path, render_report(report, &plain))?;
            log::info!("Report written to {}", path.display());
            if !quiet {
                println!("Report written to: {}", path.display());
            }
        }
        None => println!("{}", render_report(report, options)),
    }
    Ok(())
}

/// Run one inspection pass and output the report.
pub async fn handle_report(globals: &GlobalOptions, options: ReportOptions) -> Result<()> {
    let inspector = globals.inspector(options.filters.clone()).await?;
    let report = inspector.inspect().await;
    emit(&report, &options, globals.quiet)
}
