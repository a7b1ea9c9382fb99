//! Live storage inspector: fetches a snapshot and runs the analysis.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     StorageInspector                         │
//! │                                                              │
//! │  nodes ─┐                                                    │
//! │ volumes ┼─ join! ──► PVs ──► claim namespaces ──► pods       │
//! │replicas ┘               (join_all, one per namespace)        │
//! │                                  │                           │
//! │                                  ▼                           │
//! │                          ClusterSnapshot                     │
//! │                                  │                           │
//! │                                  ▼                           │
//! │                  analyze_snapshot ──► StorageReport          │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use super::cluster_client::{ClusterError, ClusterTarget, StorageClient};
use super::config::InspectConfig;
use super::relationships::claim_namespaces;
use super::snapshot::{ClusterSnapshot, analyze_snapshot};
use super::types::StorageReport;
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::time::Instant;

/// Runs inspection passes against one cluster.
pub struct StorageInspector {
    client: StorageClient,
    config: InspectConfig,
}

impl StorageInspector {
    /// Connect to the cluster described by `target`.
    pub async fn connect(target: &ClusterTarget, config: InspectConfig) -> Result<Self, ClusterError> {
        let client = StorageClient::connect(target, &config.namespace).await?;
        Ok(Self { client, config })
    }

    /// Fetch every collection one pass needs.
    ///
    /// Independent reads run concurrently; pods are read after PVs because
    /// the claim namespaces come from the PV list.
    pub async fn snapshot(&self) -> ClusterSnapshot {
        let (nodes, volumes, replicas, persistent_volumes) = tokio::join!(
            self.client.list_nodes(),
            self.client.list_volumes(),
            self.client.list_replicas(),
            self.client.list_persistent_volumes(),
        );

        let namespaces = match &persistent_volumes {
            Ok(pvs) => claim_namespaces(pvs, &self.config.driver),
            Err(_) => Default::default(),
        };
        log::debug!("Listing pods in {} claim namespaces", namespaces.len());

        let pod_lists = join_all(namespaces.iter().map(|ns| self.client.list_pods(ns))).await;
        let pods: BTreeMap<_, _> = namespaces.into_iter().zip(pod_lists).collect();

        ClusterSnapshot {
            nodes,
            volumes,
            replicas,
            persistent_volumes,
            pods,
        }
    }

    /// Run one full inspection pass.
    pub async fn inspect(&self) -> StorageReport {
        let start = Instant::now();
        let snapshot = self.snapshot().await;
        let mut report = analyze_snapshot(&snapshot, &self.config);
        report.metadata.duration_ms = start.elapsed().as_millis() as u64;
        report
    }
}
