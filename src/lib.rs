//! # lhmon
//!
//! A command-line inspector for Longhorn storage on Kubernetes. It reads
//! Longhorn disks, volumes and replicas, joins them to the PersistentVolumes,
//! claims and pods that use them, and explains what is wrong and what can be
//! removed.
//!
//! ## Features
//!
//! - **Capacity**: per-disk totals, availability and usage
//! - **Relationships**: volume → PV → claim → consumer pods
//! - **Diagnostics**: rule-based classification of failed volume conditions
//!   with remediation text, plus disk configuration problems
//! - **Cleanup**: volumes that are safe to delete, with the delete command
//!
//! ## Example
//!
//! ```rust,no_run
//! use lhmon::analyzer::storage::{ClusterTarget, InspectConfig, StorageInspector};
//!
//! # async fn run() -> lhmon::Result<()> {
//! let inspector = StorageInspector::connect(&ClusterTarget::default(), InspectConfig::new()).await?;
//! let report = inspector.inspect().await;
//! println!("{} volumes", report.summary.volumes);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;

pub use error::{ConfigError, LhmonError, Result};
use cli::{Cli, Commands};

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dispatch a parsed command line.
pub async fn run_command(cli: Cli, file_config: config::types::Config) -> Result<()> {
    let globals = handlers::GlobalOptions::from_cli(&cli, &file_config);
    match cli.command {
        Commands::Report { filters, output } => {
            let options = handlers::ReportOptions::resolve(&globals, &file_config, filters, output)?;
            handlers::handle_report(&globals, options).await
        }
        Commands::Watch {
            filters,
            output,
            interval,
        } => {
            let options = handlers::ReportOptions::resolve(&globals, &file_config, filters, output)?;
            let interval = interval.unwrap_or(file_config.watch.interval_secs);
            handlers::handle_watch(&globals, options, interval).await
        }
        Commands::Cleanup { filters } => handlers::handle_cleanup(&globals, filters).await,
    }
}
