use crate::analyzer::storage::{OutputFormat as ReportLayout, StorageFilters};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lhmon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect Longhorn storage on a Kubernetes cluster")]
#[command(long_about = "Reports Longhorn disk capacity, volume health and replica placement, joins volumes to the PersistentVolumes, claims and pods that use them, diagnoses failed volumes and lists volumes that are safe to delete.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the kubeconfig file
    #[arg(long, global = true, value_name = "FILE")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Namespace Longhorn is installed in
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a full storage report
    Report {
        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Re-run the report on an interval until interrupted
    Watch {
        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,

        /// Seconds between refreshes
        #[arg(short, long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },

    /// List volumes that are safe to delete, with the commands to delete them
    Cleanup {
        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Narrow what the report shows.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only this node
    #[arg(long)]
    pub node: Option<String>,

    /// Only this disk
    #[arg(long)]
    pub disk: Option<String>,

    /// Only this volume
    #[arg(long)]
    pub volume: Option<String>,

    /// Only disks carrying this tag, and volumes selecting it
    #[arg(long)]
    pub disk_tag: Option<String>,
}

impl FilterArgs {
    pub fn into_filters(self) -> StorageFilters {
        StorageFilters::new()
            .with_node(self.node)
            .with_disk(self.disk)
            .with_volume(self.volume)
            .with_disk_tag(self.disk_tag)
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Borderless tables without section descriptions
    #[arg(long)]
    pub compact: bool,

    /// Show extra columns
    #[arg(long)]
    pub detailed: bool,

    /// Hide the replica section
    #[arg(long)]
    pub no_replicas: bool,

    /// Hide the Kubernetes relationships section
    #[arg(long)]
    pub no_relationships: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
    Yaml,
    Summary,
}

impl From<ReportFormat> for ReportLayout {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Table => ReportLayout::Table,
            ReportFormat::Json => ReportLayout::Json,
            ReportFormat::Yaml => ReportLayout::Yaml,
            ReportFormat::Summary => ReportLayout::Summary,
        }
    }
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report_with_filters() {
        let cli = Cli::try_parse_from([
            "lhmon",
            "-n",
            "storage",
            "report",
            "--disk-tag",
            "fast",
            "--format",
            "json",
            "--no-replicas",
        ])
        .unwrap();

        assert_eq!(cli.namespace.as_deref(), Some("storage"));
        match cli.command {
            Commands::Report { filters, output } => {
                assert_eq!(filters.disk_tag.as_deref(), Some("fast"));
                assert_eq!(output.format, Some(ReportFormat::Json));
                assert!(output.no_replicas);
                assert!(!output.no_relationships);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lhmon", "cleanup", "--no-color", "-vv"]).unwrap();
        assert!(cli.no_color);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_watch_rejects_zero_interval() {
        assert!(Cli::try_parse_from(["lhmon", "watch", "--interval", "0"]).is_err());
        let cli = Cli::try_parse_from(["lhmon", "watch", "-i", "10"]).unwrap();
        match cli.command {
            Commands::Watch { interval, .. } => assert_eq!(interval, Some(10)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_empty_filter_values_are_ignored() {
        let filters = FilterArgs {
            node: Some(String::new()),
            volume: Some("pvc-1".to_string()),
            ..Default::default()
        }
        .into_filters();
        assert!(filters.node.is_none());
        assert_eq!(filters.volume.as_deref(), Some("pvc-1"));
    }
}
