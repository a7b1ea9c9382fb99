//! A single pass worth of cluster reads, and the pure analysis over it.
//!
//! The reads in a snapshot are not transactional: a volume may vanish
//! between the volume list and the PV list, a pod may start mid-pass. Every
//! join treats a missing counterpart as absent. A collection that failed to
//! list only degrades the sections that depend on it.

use super::cluster_client::ClusterError;
use super::collector::{VolumeTagIndex, collect_disks, collect_replicas, collect_volumes};
use super::config::{InspectConfig, StorageFilters};
use super::diagnostics::{
    apply_deletion_verdicts, deletion_candidates, deletion_candidates_from_pvs, diagnose_disks,
    diagnose_volumes,
};
use super::relationships::{PodIndex, resolve};
use super::rules::all_rules;
use super::types::{CollectionError, ResourceKind, StorageReport};
use k8s_openapi::api::core::v1::{PersistentVolume, Pod};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw collections fetched for one inspection pass.
#[derive(Debug)]
pub struct ClusterSnapshot {
    pub nodes: Result<Vec<Value>, ClusterError>,
    pub volumes: Result<Vec<Value>, ClusterError>,
    pub replicas: Result<Vec<Value>, ClusterError>,
    pub persistent_volumes: Result<Vec<PersistentVolume>, ClusterError>,
    /// Pods per claim namespace.
    pub pods: BTreeMap<String, Result<Vec<Pod>, ClusterError>>,
}

impl Default for ClusterSnapshot {
    fn default() -> Self {
        Self {
            nodes: Ok(Vec::new()),
            volumes: Ok(Vec::new()),
            replicas: Ok(Vec::new()),
            persistent_volumes: Ok(Vec::new()),
            pods: BTreeMap::new(),
        }
    }
}

/// Borrow a collection, recording its error and yielding nothing if it failed.
fn available<'a, T>(
    collection: &'a Result<Vec<T>, ClusterError>,
    resource: ResourceKind,
    errors: &mut Vec<CollectionError>,
) -> &'a [T] {
    match collection {
        Ok(items) => items,
        Err(e) => {
            log::warn!("Could not list {}: {}", resource, e);
            errors.push(CollectionError {
                resource,
                namespace: None,
                message: e.to_string(),
            });
            &[]
        }
    }
}

/// Run the whole analysis over a snapshot.
///
/// Disk capacity seen by the diagnostics is always cluster-wide: filters
/// narrow what is reported, never the pool a tag mismatch is judged against.
pub fn analyze_snapshot(snapshot: &ClusterSnapshot, config: &InspectConfig) -> StorageReport {
    let filters = &config.filters;
    let mut report = StorageReport::new(&config.namespace);
    let mut errors = Vec::new();

    let nodes = available(&snapshot.nodes, ResourceKind::Nodes, &mut errors);
    let volume_docs = available(&snapshot.volumes, ResourceKind::Volumes, &mut errors);
    let replica_docs = available(&snapshot.replicas, ResourceKind::Replicas, &mut errors);
    let pvs = available(
        &snapshot.persistent_volumes,
        ResourceKind::PersistentVolumes,
        &mut errors,
    );

    let mut pod_index = PodIndex::default();
    for (namespace, pods) in &snapshot.pods {
        match pods {
            Ok(pods) => pod_index.insert_namespace(namespace, pods),
            Err(e) => {
                log::warn!("Could not list pods in {}: {}", namespace, e);
                errors.push(CollectionError {
                    resource: ResourceKind::Pods,
                    namespace: Some(namespace.clone()),
                    message: e.to_string(),
                });
            }
        }
    }

    let all_disks = collect_disks(nodes, &StorageFilters::default());
    report.disks = collect_disks(nodes, filters);

    let mut volumes = collect_volumes(volume_docs, filters);
    let tag_index = VolumeTagIndex::build(volume_docs, filters.disk_tag.as_deref());
    report.replicas = collect_replicas(replica_docs, &tag_index, filters);

    report.relationships = resolve(&volumes, pvs, &pod_index, filters, &config.driver);

    // Without the PV list an unbound volume cannot be told from a bound one.
    if snapshot.persistent_volumes.is_ok() {
        if snapshot.volumes.is_ok() {
            apply_deletion_verdicts(&mut volumes, &report.relationships);
            report.deletion_candidates =
                deletion_candidates(&volumes, &report.relationships, &config.namespace);
        } else {
            report.deletion_candidates =
                deletion_candidates_from_pvs(&report.relationships, &config.namespace);
        }
    }

    let rules = all_rules();
    report.volume_findings = diagnose_volumes(&volumes, &all_disks, &rules, config);

    let disk_filters = StorageFilters {
        disk_tag: None,
        volume: None,
        ..filters.clone()
    };
    report.disk_issues = diagnose_disks(nodes, &disk_filters);

    report.volumes = volumes;
    report.collection_errors = errors;
    report.sort();
    report.update_summary();

    log::info!(
        "Analyzed {} disks, {} volumes, {} PVs: {} volume findings, {} disk issues",
        report.summary.disks,
        report.summary.volumes,
        report.summary.persistent_volumes,
        report.summary.volume_findings,
        report.summary.disk_issues
    );

    report
}
