//! Longhorn storage inspection.
//!
//! Reads Longhorn nodes, volumes and replicas alongside the Kubernetes
//! PersistentVolumes and Pods that use them, then:
//!
//! - reports disk capacity and usage
//! - joins each volume to its PV, claim and consumer pods
//! - diagnoses unhealthy volumes and disks against a rule table
//! - decides which volumes are safe to delete
//!
//! # Example
//!
//! ```rust,ignore
//! use lhmon::analyzer::storage::{ClusterTarget, InspectConfig, StorageInspector};
//!
//! let inspector = StorageInspector::connect(&ClusterTarget::default(), InspectConfig::new()).await?;
//! let report = inspector.inspect().await;
//! ```

pub mod capacity;
pub mod cluster_client;
pub mod collector;
pub mod config;
pub mod diagnostics;
pub mod fields;
pub mod formatter;
pub mod inspector;
pub mod relationships;
pub mod rules;
pub mod snapshot;
pub mod types;

pub use cluster_client::{ClusterError, ClusterTarget, StorageClient};
pub use config::{DEFAULT_DRIVER, DEFAULT_NAMESPACE, InspectConfig, StorageFilters};
pub use formatter::{
    OutputFormat, PresenterOptions, format_cleanup, format_report, format_report_to_string,
};
pub use inspector::StorageInspector;
pub use rules::{DiagnosticRule, all_rules};
pub use snapshot::{ClusterSnapshot, analyze_snapshot};
pub use types::{
    ByteSize, DeletionCandidate, DeletionReason, DiagnosticFinding, Disk, DiskIssue,
    PersistentVolumeRecord, Replica, StorageReport, StorageSummary, Volume,
};
