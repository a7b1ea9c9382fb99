// Handler modules
pub mod cleanup;
pub mod report;
pub mod watch;

// Re-export all handler functions
pub use cleanup::handle_cleanup;
pub use report::{ReportOptions, handle_report, render_report};
pub use watch::handle_watch;

use crate::analyzer::storage::{
    ClusterTarget, InspectConfig, StorageClient, StorageFilters, StorageInspector,
};
use crate::cli::Cli;
use crate::config::types::Config;
use crate::error::Result;

/// Settings shared by every command, after merging flags over the config file.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub target: ClusterTarget,
    pub namespace: String,
    pub driver: String,
    pub ignore_rules: Vec<String>,
    pub color: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli, config: &Config) -> Self {
        Self {
            target: ClusterTarget {
                kubeconfig: cli
                    .kubeconfig
                    .clone()
                    .or_else(|| config.cluster.kubeconfig.clone()),
                context: cli.context.clone().or_else(|| config.cluster.context.clone()),
            },
            namespace: cli
                .namespace
                .clone()
                .unwrap_or_else(|| config.cluster.namespace.clone()),
            driver: config.cluster.driver.clone(),
            ignore_rules: config.cluster.ignore_rules.clone(),
            color: config.output.color && !cli.no_color,
            quiet: cli.quiet,
        }
    }

    pub fn inspect_config(&self, filters: StorageFilters) -> InspectConfig {
        self.ignore_rules.iter().fold(
            InspectConfig::new()
                .with_namespace(&self.namespace)
                .with_driver(&self.driver)
                .with_filters(filters),
            |config, rule| config.ignore_rule(rule),
        )
    }

    /// Connect an inspector for one command run.
    pub(crate) async fn inspector(&self, filters: StorageFilters) -> Result<StorageInspector> {
        let context = StorageClient::current_context(&self.target)
            .unwrap_or_else(|_| "in-cluster".to_string());
        log::info!(
            "Connecting to cluster (context {}, namespace {})",
            context,
            self.namespace
        );
        Ok(StorageInspector::connect(&self.target, self.inspect_config(filters)).await?)
    }
}
