//! Turns raw Longhorn CRD documents into typed, filtered records.
//!
//! Malformed or partially-populated documents never fail a collection: a
//! node without disk maps or a disk without status is skipped, missing
//! fields are zero-filled, and collection carries on. Replicas without a
//! volume name are grouped under the empty name.

use super::capacity::{active_replica_count, percent_used};
use super::config::StorageFilters;
use super::fields::{
    lookup, nested_f64, nested_i64, nested_map, nested_slice, nested_string,
    nested_string_slice, object_name,
};
use super::types::{ByteSize, Condition, Disk, Replica, Robustness, Volume, VolumeState};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Parse a list of condition objects. Non-object entries are dropped.
pub(crate) fn parse_conditions(items: &[Value]) -> Vec<Condition> {
    items
        .iter()
        .filter(|c| c.is_object())
        .map(|c| Condition {
            condition_type: nested_string(c, &["type"]),
            status: nested_string(c, &["status"]),
            reason: nested_string(c, &["reason"]),
            message: nested_string(c, &["message"]),
            timestamp: nested_string(c, &["lastTransitionTime"]),
        })
        .collect()
}

/// Disk spec and status maps of a node, or `None` if either is missing.
pub(crate) fn node_disk_maps(node: &Value) -> Option<(&Map<String, Value>, &Map<String, Value>)> {
    let specs = nested_map(node, &["spec", "disks"])?;
    let statuses = nested_map(node, &["status", "diskStatus"])?;
    Some((specs, statuses))
}

fn disk_tags(spec: &Value) -> Vec<String> {
    nested_string_slice(spec, &["tags"]).unwrap_or_default()
}

fn parse_disk(node_name: &str, disk_name: &str, spec: &Value, status: &Value) -> Disk {
    let bytes = |key: &str| ByteSize(nested_f64(status, &[key]).unwrap_or(0.0));
    let storage_maximum = bytes("storageMaximum");
    let storage_available = bytes("storageAvailable");

    Disk {
        node_name: node_name.to_string(),
        disk_name: disk_name.to_string(),
        path: nested_string(spec, &["path"]),
        tags: disk_tags(spec),
        disk_type: nested_string(spec, &["diskType"]),
        storage_maximum,
        storage_reserved: bytes("storageReserved"),
        storage_scheduled: bytes("storageScheduled"),
        storage_available,
        percent_used: percent_used(storage_maximum, storage_available),
        conditions: nested_slice(status, &["conditions"])
            .map(|c| parse_conditions(c))
            .unwrap_or_default(),
    }
}

/// Collect disks from Longhorn node documents.
pub fn collect_disks(nodes: &[Value], filters: &StorageFilters) -> Vec<Disk> {
    let mut disks = Vec::new();

    for node in nodes {
        let node_name = object_name(node);
        if !filters.matches_node(&node_name) {
            continue;
        }

        let Some((specs, statuses)) = node_disk_maps(node) else {
            log::debug!("Node {} has no disk spec or status, skipping", node_name);
            continue;
        };

        for (disk_name, spec) in specs {
            if !filters.matches_disk(disk_name) || !spec.is_object() {
                continue;
            }
            if !filters.matches_tags(&disk_tags(spec)) {
                continue;
            }
            let Some(status) = statuses.get(disk_name).filter(|s| s.is_object()) else {
                log::debug!("Disk {}/{} has no status entry", node_name, disk_name);
                continue;
            };
            disks.push(parse_disk(&node_name, disk_name, spec, status));
        }
    }

    disks
}

fn parse_volume(doc: &Value) -> Volume {
    let state = VolumeState::parse(&nested_string(doc, &["status", "state"]));
    let robustness = Robustness::parse(&nested_string(doc, &["status", "robustness"]));

    let conditions = nested_slice(doc, &["status", "conditions"])
        .map(|c| parse_conditions(c))
        .unwrap_or_default();
    let scheduling_failure = conditions
        .iter()
        .find(|c| c.condition_type == "Scheduled" && c.is_false());

    let (replica_count, observed_rw) = nested_map(doc, &["status", "replicas"])
        .map(|replicas| {
            let rw = replicas
                .values()
                .filter(|r| lookup(r, &["mode"]).and_then(Value::as_str) == Some("RW"))
                .count();
            (replicas.len() as u32, rw as u32)
        })
        .unwrap_or((0, 0));

    Volume {
        name: object_name(doc),
        size: ByteSize(nested_f64(doc, &["spec", "size"]).unwrap_or(0.0)),
        actual_size: ByteSize(nested_f64(doc, &["status", "actualSize"]).unwrap_or(0.0)),
        node: nested_string(doc, &["status", "currentNodeID"]),
        replica_count,
        active_replicas: active_replica_count(&state, &robustness, observed_rw),
        desired_replicas: nested_i64(doc, &["spec", "numberOfReplicas"])
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        scheduled: scheduling_failure.is_none(),
        scheduling_message: scheduling_failure.map(|c| c.message.clone()),
        disk_selector: nested_string_slice(doc, &["spec", "diskSelector"]).unwrap_or_default(),
        node_selector: nested_string_slice(doc, &["spec", "nodeSelector"]).unwrap_or_default(),
        state,
        robustness,
        conditions,
        deletion: None,
    }
}

/// Collect volumes from Longhorn volume documents.
///
/// With a tag filter only volumes whose disk selector contains the tag are
/// kept.
pub fn collect_volumes(volumes: &[Value], filters: &StorageFilters) -> Vec<Volume> {
    volumes
        .iter()
        .filter(|doc| filters.matches_volume(&object_name(doc)))
        .map(parse_volume)
        .filter(|v| filters.matches_tags(&v.disk_selector))
        .collect()
}

/// Names of volumes whose disk selector contains a tag.
///
/// Replicas carry no tag information, so tag filtering of replicas goes
/// through this index first.
#[derive(Debug, Clone, Default)]
pub struct VolumeTagIndex {
    tag: Option<String>,
    volumes: HashSet<String>,
}

impl VolumeTagIndex {
    pub fn build(volumes: &[Value], tag: Option<&str>) -> Self {
        let Some(tag) = tag else {
            return Self::default();
        };
        let volumes = volumes
            .iter()
            .filter(|doc| {
                nested_string_slice(doc, &["spec", "diskSelector"])
                    .is_some_and(|sel| sel.iter().any(|t| t == tag))
            })
            .map(object_name)
            .collect();
        Self {
            tag: Some(tag.to_string()),
            volumes,
        }
    }

    /// True when no tag is set or the volume uses it.
    pub fn admits(&self, volume: &str) -> bool {
        self.tag.is_none() || self.volumes.contains(volume)
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

fn parse_replica(doc: &Value) -> Replica {
    let state = nested_string(doc, &["status", "state"]);
    let failed_at = nested_string(doc, &["status", "failedAt"]);
    let healthy = state != "ERR" && state != "FAILED" && failed_at.is_empty();

    Replica {
        name: object_name(doc),
        volume_name: nested_string(doc, &["spec", "volumeName"]),
        instance_id: nested_string(doc, &["status", "instanceID"]),
        node_id: nested_string(doc, &["spec", "nodeID"]),
        disk_id: nested_string(doc, &["spec", "diskID"]),
        disk_path: nested_string(doc, &["spec", "diskPath"]),
        data_path: nested_string(doc, &["status", "currentReplicaAddressMap", "dataPath"]),
        size: ByteSize(nested_f64(doc, &["spec", "size"]).unwrap_or(0.0)),
        mode: nested_string(doc, &["spec", "mode"]),
        state,
        failed_at,
        healthy,
    }
}

/// Collect replicas grouped by volume name.
pub fn collect_replicas(
    replicas: &[Value],
    tag_index: &VolumeTagIndex,
    filters: &StorageFilters,
) -> BTreeMap<String, Vec<Replica>> {
    let mut by_volume: BTreeMap<String, Vec<Replica>> = BTreeMap::new();

    for doc in replicas {
        let replica = parse_replica(doc);
        if !filters.matches_volume(&replica.volume_name) || !tag_index.admits(&replica.volume_name) {
            continue;
        }
        by_volume
            .entry(replica.volume_name.clone())
            .or_default()
            .push(replica);
    }

    by_volume
}
