//! Resolves the Longhorn volume → PersistentVolume → claim → Pod graph.
//!
//! All joins go through maps built once per pass. A counterpart that cannot
//! be found (a PV whose volume vanished, a namespace whose pods could not be
//! listed) is treated as absent; resolution itself never fails.

use super::config::StorageFilters;
use super::types::{ClaimRef, PersistentVolumeRecord, PodRecord, Volume};
use k8s_openapi::api::core::v1::{PersistentVolume, Pod};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Pods indexed by the (namespace, claim name) pairs they mount.
#[derive(Debug, Clone, Default)]
pub struct PodIndex {
    by_claim: HashMap<(String, String), Vec<PodRecord>>,
}

fn pod_record(pod: &Pod, namespace: &str) -> PodRecord {
    PodRecord {
        name: pod.metadata.name.clone().unwrap_or_default(),
        namespace: pod
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| namespace.to_string()),
        phase: pod
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_default(),
        node_name: pod
            .spec
            .as_ref()
            .and_then(|s| s.node_name.clone())
            .unwrap_or_default(),
    }
}

/// Distinct claim names mounted by a pod.
fn claims_mounted_by(pod: &Pod) -> BTreeSet<&str> {
    pod.spec
        .iter()
        .flat_map(|spec| spec.volumes.iter().flatten())
        .filter_map(|v| v.persistent_volume_claim.as_ref())
        .map(|pvc| pvc.claim_name.as_str())
        .collect()
}

impl PodIndex {
    /// Build from pods listed per namespace.
    pub fn build(pods_by_namespace: &HashMap<String, Vec<Pod>>) -> Self {
        let mut index = Self::default();
        for (namespace, pods) in pods_by_namespace {
            index.insert_namespace(namespace, pods);
        }
        index
    }

    /// Index the pods of one namespace.
    ///
    /// A pod mounting the same claim through several volume entries is
    /// recorded once for that claim.
    pub fn insert_namespace(&mut self, namespace: &str, pods: &[Pod]) {
        for pod in pods {
            let claims = claims_mounted_by(pod);
            if claims.is_empty() {
                continue;
            }
            let record = pod_record(pod, namespace);
            for claim in claims {
                self.by_claim
                    .entry((namespace.to_string(), claim.to_string()))
                    .or_default()
                    .push(record.clone());
            }
        }
    }

    /// Pods mounting `claim` in `namespace`.
    pub fn consumers(&self, namespace: &str, claim: &str) -> &[PodRecord] {
        self.by_claim
            .get(&(namespace.to_string(), claim.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_claim.is_empty()
    }
}

/// Longhorn volume name of a PV provisioned by `driver`.
pub fn longhorn_volume_handle<'a>(pv: &'a PersistentVolume, driver: &str) -> Option<&'a str> {
    let csi = pv.spec.as_ref()?.csi.as_ref()?;
    (csi.driver == driver).then_some(csi.volume_handle.as_str())
}

fn claim_ref(pv: &PersistentVolume) -> Option<ClaimRef> {
    let claim = pv.spec.as_ref()?.claim_ref.as_ref()?;
    let name = claim.name.as_deref().filter(|n| !n.is_empty())?;
    let namespace = claim.namespace.as_deref().filter(|n| !n.is_empty())?;
    Some(ClaimRef {
        name: name.to_string(),
        namespace: namespace.to_string(),
    })
}

/// Namespaces whose pods are needed to resolve consumers of Longhorn PVs.
pub fn claim_namespaces(persistent_volumes: &[PersistentVolume], driver: &str) -> BTreeSet<String> {
    persistent_volumes
        .iter()
        .filter(|pv| longhorn_volume_handle(pv, driver).is_some())
        .filter_map(claim_ref)
        .map(|claim| claim.namespace)
        .collect()
}

/// Build a record for a Longhorn-backed PV, without consumers.
pub fn persistent_volume_record(pv: &PersistentVolume, driver: &str) -> Option<PersistentVolumeRecord> {
    let handle = longhorn_volume_handle(pv, driver)?;
    let spec = pv.spec.as_ref();

    Some(PersistentVolumeRecord {
        name: pv.metadata.name.clone().unwrap_or_default(),
        storage_class: spec
            .and_then(|s| s.storage_class_name.clone())
            .unwrap_or_default(),
        capacity: spec
            .and_then(|s| s.capacity.as_ref())
            .and_then(|c| c.get("storage"))
            .map(|q| q.0.clone())
            .unwrap_or_default(),
        phase: pv
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_default(),
        volume_handle: handle.to_string(),
        claim: claim_ref(pv),
        consumer_pods: Vec::new(),
    })
}

/// Map each Longhorn volume to the PV that exposes it, with claim and pods.
///
/// `volumes` must already be filtered; with a tag filter active only PVs
/// whose handle names one of those volumes are kept.
pub fn resolve(
    volumes: &[Volume],
    persistent_volumes: &[PersistentVolume],
    pods: &PodIndex,
    filters: &StorageFilters,
    driver: &str,
) -> BTreeMap<String, PersistentVolumeRecord> {
    let identities: HashSet<&str> = volumes.iter().map(|v| v.name.as_str()).collect();
    let mut records = BTreeMap::new();

    for pv in persistent_volumes {
        let Some(mut record) = persistent_volume_record(pv, driver) else {
            continue;
        };
        if !filters.matches_volume(&record.volume_handle) {
            continue;
        }
        if filters.disk_tag.is_some() && !identities.contains(record.volume_handle.as_str()) {
            continue;
        }

        if let Some(claim) = &record.claim {
            record.consumer_pods = pods.consumers(&claim.namespace, &claim.name).to_vec();
        }

        records.insert(record.volume_handle.clone(), record);
    }

    log::debug!("Resolved {} Longhorn-backed PersistentVolumes", records.len());
    records
}
