//! Core types for Longhorn storage inspection.
//!
//! These types are the typed view of the raw Longhorn CRDs and native
//! Kubernetes objects, plus the derived findings produced by the diagnostic
//! engine. Everything here is serializable so the report can be emitted as
//! JSON or YAML.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

// ============================================================================
// Byte sizes
// ============================================================================

/// A quantity of bytes.
///
/// Arithmetic is done on raw byte counts; the power-of-1024 units only affect
/// how the value is displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ByteSize(pub f64);

impl ByteSize {
    pub const KB: ByteSize = ByteSize((1u64 << 10) as f64);
    pub const MB: ByteSize = ByteSize((1u64 << 20) as f64);
    pub const GB: ByteSize = ByteSize((1u64 << 30) as f64);
    pub const TB: ByteSize = ByteSize((1u64 << 40) as f64);
    pub const PB: ByteSize = ByteSize((1u64 << 50) as f64);

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        if b >= Self::PB.0 {
            write!(f, "{:.2} PB", b / Self::PB.0)
        } else if b >= Self::TB.0 {
            write!(f, "{:.2} TB", b / Self::TB.0)
        } else if b >= Self::GB.0 {
            write!(f, "{:.2} GB", b / Self::GB.0)
        } else if b >= Self::MB.0 {
            write!(f, "{:.2} MB", b / Self::MB.0)
        } else if b >= Self::KB.0 {
            write!(f, "{:.2} KB", b / Self::KB.0)
        } else {
            write!(f, "{:.2} B", b)
        }
    }
}

impl Add for ByteSize {
    type Output = ByteSize;

    fn add(self, rhs: Self) -> Self::Output {
        ByteSize(self.0 + rhs.0)
    }
}

impl AddAssign for ByteSize {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for ByteSize {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ByteSize::default(), Add::add)
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// A status assertion attached to a volume or disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    pub reason: String,
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub timestamp: String,
}

impl Condition {
    /// The condition reports status `False`.
    pub fn is_false(&self) -> bool {
        self.status == "False"
    }
}

// ============================================================================
// Volume state and robustness
// ============================================================================

/// Attachment state of a Longhorn volume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VolumeState {
    Attached,
    Detached,
    Attaching,
    Detaching,
    Creating,
    Deleting,
    Error,
    /// Any state this tool does not know about, kept verbatim.
    Other(String),
}

impl VolumeState {
    pub fn parse(s: &str) -> Self {
        match s {
            "attached" => Self::Attached,
            "detached" => Self::Detached,
            "attaching" => Self::Attaching,
            "detaching" => Self::Detaching,
            "creating" => Self::Creating,
            "deleting" => Self::Deleting,
            "error" => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Attaching => "attaching",
            Self::Detaching => "detaching",
            Self::Creating => "creating",
            Self::Deleting => "deleting",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }
}

impl Default for VolumeState {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for VolumeState {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<VolumeState> for String {
    fn from(state: VolumeState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for VolumeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Longhorn's health classification of a volume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Robustness {
    Healthy,
    Degraded,
    Faulted,
    Unknown,
    Other(String),
}

impl Robustness {
    pub fn parse(s: &str) -> Self {
        match s {
            "healthy" => Self::Healthy,
            "degraded" => Self::Degraded,
            "faulted" => Self::Faulted,
            "unknown" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Faulted => "faulted",
            Self::Unknown => "unknown",
            Self::Other(s) => s,
        }
    }

    /// Degraded, faulted or unknown.
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Degraded | Self::Faulted | Self::Unknown)
    }
}

impl Default for Robustness {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for Robustness {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Robustness> for String {
    fn from(robustness: Robustness) -> Self {
        robustness.as_str().to_string()
    }
}

impl fmt::Display for Robustness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Disks, volumes, replicas
// ============================================================================

/// A Longhorn disk attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    pub node_name: String,
    pub disk_name: String,
    pub path: String,
    pub tags: Vec<String>,
    pub disk_type: String,
    pub storage_maximum: ByteSize,
    pub storage_reserved: ByteSize,
    pub storage_scheduled: ByteSize,
    pub storage_available: ByteSize,
    pub percent_used: f64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub conditions: Vec<Condition>,
}

/// Why a volume may be deleted without affecting a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionReason {
    /// The bound PV was released by its claim.
    PvReleased,
    /// The bound PV failed reclamation.
    PvFailed,
    /// No PV references the volume and it is not attached anywhere.
    DetachedUnbound,
}

impl DeletionReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::PvReleased => "PV is in Released state and no longer used by any pod",
            Self::PvFailed => "PV is in Failed state",
            Self::DetachedUnbound => "Volume is detached and not bound to any PV",
        }
    }
}

impl fmt::Display for DeletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A Longhorn volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub name: String,
    pub size: ByteSize,
    pub actual_size: ByteSize,
    pub state: VolumeState,
    pub robustness: Robustness,
    /// Node the volume is currently attached to, empty when detached.
    pub node: String,
    /// Number of entries in the status replica map.
    pub replica_count: u32,
    /// Replicas in `RW` mode.
    ///
    /// When none are observed but the volume is attached and healthy this is
    /// reported as 1. That is an approximation: the active replica is implied
    /// by the volume's health, not read from the replica map.
    pub active_replicas: u32,
    pub desired_replicas: u32,
    pub scheduled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduling_message: Option<String>,
    pub disk_selector: Vec<String>,
    pub node_selector: Vec<String>,
    pub conditions: Vec<Condition>,
    /// Set once relationships are resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion: Option<DeletionReason>,
}

impl Volume {
    /// `active/desired`, e.g. `2/3`.
    pub fn replica_status(&self) -> String {
        format!("{}/{}", self.active_replicas, self.desired_replicas)
    }

    pub fn delete_reason(&self) -> Option<&'static str> {
        self.deletion.map(|r| r.message())
    }
}

/// One physical copy of a volume's data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Replica {
    pub name: String,
    pub volume_name: String,
    pub instance_id: String,
    pub node_id: String,
    pub disk_id: String,
    pub disk_path: String,
    pub data_path: String,
    pub state: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub failed_at: String,
    pub size: ByteSize,
    pub mode: String,
    pub healthy: bool,
}

// ============================================================================
// Native Kubernetes relationships
// ============================================================================

/// Claim bound to a persistent volume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimRef {
    pub name: String,
    pub namespace: String,
}

/// A pod consuming a claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodRecord {
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub node_name: String,
}

/// A native PersistentVolume backed by a Longhorn volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistentVolumeRecord {
    pub name: String,
    pub storage_class: String,
    /// Capacity quantity as written on the PV (e.g. `10Gi`).
    pub capacity: String,
    pub phase: String,
    /// Longhorn volume name.
    pub volume_handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim: Option<ClaimRef>,
    pub consumer_pods: Vec<PodRecord>,
}

impl PersistentVolumeRecord {
    pub fn is_released_or_failed(&self) -> bool {
        self.phase == "Released" || self.phase == "Failed"
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A rule/check code identifier for diagnostic findings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleCode(pub String);

impl RuleCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RuleCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Classification of a volume issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// No disk satisfies the volume's disk selector
    TagMismatch,
    /// Not enough space to place a replica
    InsufficientStorage,
    /// No node satisfies the volume's node selector
    NodeTagMismatch,
    /// Volume creation failed
    CreationError,
    /// Volume attachment failed
    AttachError,
    /// Failed condition with a message no rule recognises
    Unclassified,
    /// Unhealthy state without a failed condition
    State,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TagMismatch => "tag_mismatch",
            Self::InsufficientStorage => "insufficient_storage",
            Self::NodeTagMismatch => "node_tag_mismatch",
            Self::CreationError => "creation_error",
            Self::AttachError => "attach_error",
            Self::Unclassified => "unclassified",
            Self::State => "state",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disks satisfying a tag requirement and their combined free space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskPool {
    pub disk_count: usize,
    pub total_available: ByteSize,
}

/// A diagnosed volume issue with remediation guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticFinding {
    pub volume: String,
    pub state: VolumeState,
    pub robustness: Robustness,
    pub replica_status: String,
    pub rule_code: RuleCode,
    pub kind: IssueKind,
    pub issue: String,
    pub remediation: String,
    /// Disk pool evidence for tag-mismatch findings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<DiskPool>,
}

/// Classification of a disk issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum DiskIssueKind {
    NoTags,
    NoStatus,
    ConditionFalse { condition: String, reason: String },
}

/// A problem detected on a disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskIssue {
    pub node_name: String,
    pub disk_name: String,
    pub kind: DiskIssueKind,
    pub message: String,
}

/// A volume that can be deleted, with a ready-to-copy command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionCandidate {
    pub volume: String,
    pub reason: DeletionReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pv_phase: Option<String>,
    pub command: String,
}

// ============================================================================
// Report
// ============================================================================

/// Resource collection a transport error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Nodes,
    Volumes,
    Replicas,
    PersistentVolumes,
    Pods,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nodes => "Longhorn nodes",
            Self::Volumes => "Longhorn volumes",
            Self::Replicas => "Longhorn replicas",
            Self::PersistentVolumes => "PersistentVolumes",
            Self::Pods => "Pods",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collection that could not be listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionError {
    pub resource: ResourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub message: String,
}

/// Summary statistics for a storage report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSummary {
    pub disks: u32,
    pub total_capacity: ByteSize,
    pub total_available: ByteSize,
    pub volumes: u32,
    pub healthy: u32,
    pub degraded: u32,
    pub faulted: u32,
    pub detached: u32,
    pub volume_findings: u32,
    pub disk_issues: u32,
    pub safe_to_delete: u32,
    pub persistent_volumes: u32,
}

/// Metadata about the inspection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Longhorn namespace inspected
    pub namespace: String,
    /// Inspection duration in milliseconds
    pub duration_ms: u64,
    /// lhmon version
    pub version: String,
    /// Timestamp of the inspection
    pub timestamp: String,
}

/// Complete result of one inspection pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageReport {
    pub summary: StorageSummary,
    pub disks: Vec<Disk>,
    pub volumes: Vec<Volume>,
    pub replicas: BTreeMap<String, Vec<Replica>>,
    pub relationships: BTreeMap<String, PersistentVolumeRecord>,
    pub volume_findings: Vec<DiagnosticFinding>,
    pub disk_issues: Vec<DiskIssue>,
    pub deletion_candidates: Vec<DeletionCandidate>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub collection_errors: Vec<CollectionError>,
    pub metadata: ReportMetadata,
}

impl StorageReport {
    /// Create a new empty report.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            summary: StorageSummary::default(),
            disks: Vec::new(),
            volumes: Vec::new(),
            replicas: BTreeMap::new(),
            relationships: BTreeMap::new(),
            volume_findings: Vec::new(),
            disk_issues: Vec::new(),
            deletion_candidates: Vec::new(),
            collection_errors: Vec::new(),
            metadata: ReportMetadata {
                namespace: namespace.into(),
                duration_ms: 0,
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    pub fn collection_failed(&self, resource: ResourceKind) -> bool {
        self.collection_errors.iter().any(|e| e.resource == resource)
    }

    /// Apply display ordering: disks by node then name, volumes by name,
    /// replicas by node then name within each volume.
    pub fn sort(&mut self) {
        self.disks.sort_by(|a, b| {
            a.node_name
                .cmp(&b.node_name)
                .then_with(|| a.disk_name.cmp(&b.disk_name))
        });
        self.volumes.sort_by(|a, b| a.name.cmp(&b.name));
        for replicas in self.replicas.values_mut() {
            replicas.sort_by(|a, b| {
                a.node_id
                    .cmp(&b.node_id)
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
        self.volume_findings.sort_by(|a, b| a.volume.cmp(&b.volume));
        self.disk_issues.sort_by(|a, b| {
            a.node_name
                .cmp(&b.node_name)
                .then_with(|| a.disk_name.cmp(&b.disk_name))
        });
        self.deletion_candidates
            .sort_by(|a, b| a.volume.cmp(&b.volume));
    }

    /// Recompute summary counters from the collected sections.
    pub fn update_summary(&mut self) {
        let mut summary = StorageSummary {
            disks: self.disks.len() as u32,
            total_capacity: self.disks.iter().map(|d| d.storage_maximum).sum(),
            total_available: self.disks.iter().map(|d| d.storage_available).sum(),
            volumes: self.volumes.len() as u32,
            volume_findings: self.volume_findings.len() as u32,
            disk_issues: self.disk_issues.len() as u32,
            safe_to_delete: self.deletion_candidates.len() as u32,
            persistent_volumes: self.relationships.len() as u32,
            ..Default::default()
        };

        for volume in &self.volumes {
            match volume.robustness {
                Robustness::Healthy => summary.healthy += 1,
                Robustness::Degraded => summary.degraded += 1,
                Robustness::Faulted => summary.faulted += 1,
                _ => {}
            }
            if volume.state == VolumeState::Detached {
                summary.detached += 1;
            }
        }

        self.summary = summary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_size_display_thresholds() {
        assert_eq!(ByteSize(512.0).to_string(), "512.00 B");
        assert_eq!(ByteSize(1024.0).to_string(), "1.00 KB");
        assert_eq!(ByteSize(1536.0 * 1024.0).to_string(), "1.50 MB");
        assert_eq!(ByteSize::GB.to_string(), "1.00 GB");
        assert_eq!(ByteSize(2.0 * ByteSize::TB.0).to_string(), "2.00 TB");
        assert_eq!(ByteSize::PB.to_string(), "1.00 PB");
    }

    #[test]
    fn test_byte_size_sum() {
        let total: ByteSize = [ByteSize::GB, ByteSize::GB].into_iter().sum();
        assert_eq!(total, ByteSize(2.0 * ByteSize::GB.0));
    }

    #[test]
    fn test_volume_state_round_trip_keeps_unknown_values() {
        assert_eq!(VolumeState::parse("attached"), VolumeState::Attached);
        let odd = VolumeState::parse("migrating");
        assert_eq!(odd.as_str(), "migrating");
        let json = serde_json::to_string(&odd).unwrap();
        assert_eq!(json, "\"migrating\"");
    }

    #[test]
    fn test_robustness_unhealthy() {
        assert!(Robustness::Degraded.is_unhealthy());
        assert!(Robustness::Unknown.is_unhealthy());
        assert!(!Robustness::Healthy.is_unhealthy());
        assert!(!Robustness::parse("").is_unhealthy());
    }

    #[test]
    fn test_deletion_reason_messages_are_distinct() {
        let released = DeletionReason::PvReleased.message();
        let failed = DeletionReason::PvFailed.message();
        let detached = DeletionReason::DetachedUnbound.message();
        assert!(released.contains("Released"));
        assert!(failed.contains("Failed"));
        assert_ne!(released, detached);
    }

    #[test]
    fn test_report_sort_orders_disks_by_node_then_name() {
        let mut report = StorageReport::new("longhorn-system");
        for (node, disk) in [("n2", "a"), ("n1", "b"), ("n1", "a")] {
            report.disks.push(Disk {
                node_name: node.to_string(),
                disk_name: disk.to_string(),
                ..Default::default()
            });
        }
        report.sort();
        let order: Vec<_> = report
            .disks
            .iter()
            .map(|d| format!("{}/{}", d.node_name, d.disk_name))
            .collect();
        assert_eq!(order, vec!["n1/a", "n1/b", "n2/a"]);
    }
}
