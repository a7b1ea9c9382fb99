use crate::analyzer::storage::{DEFAULT_DRIVER, DEFAULT_NAMESPACE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cluster: ClusterConfig,
    pub output: OutputConfig,
    pub watch: WatchConfig,
}

/// Where to find the cluster and Longhorn inside it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub namespace: String,
    /// CSI driver name of Longhorn-backed PVs
    pub driver: String,
    /// Rule codes whose findings are dropped
    pub ignore_rules: Vec<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            driver: DEFAULT_DRIVER.to_string(),
            ignore_rules: Vec::new(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// table, json, yaml or summary
    pub format: String,
    pub color: bool,
    pub compact: bool,
    pub detailed: bool,
    pub show_replicas: bool,
    pub show_relationships: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "table".to_string(),
            color: true,
            compact: false,
            detailed: false,
            show_replicas: true,
            show_relationships: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}
