//! Volume and disk diagnostics, plus the safe-to-delete verdict.
//!
//! Everything here is recomputed from the current pass; no state is carried
//! between passes.

use super::collector::{node_disk_maps, parse_conditions};
use super::config::{InspectConfig, StorageFilters};
use super::fields::{lookup, nested_slice, object_name};
use super::rules::{self, DiagnosticRule, RuleContext, UNCLASSIFIED_REMEDIATION, codes};
use super::types::{
    Condition, DeletionCandidate, DeletionReason, DiagnosticFinding, Disk, DiskIssue,
    DiskIssueKind, IssueKind, PersistentVolumeRecord, Robustness, RuleCode, Volume, VolumeState,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Condition types that describe expected transient work, not failures.
const BENIGN_CONDITIONS: &[&str] = &["Restore", "WaitForBackingImage"];

const NO_SPECIFIC_CONDITION: &str = "Volume has issues but no specific condition found";

// ============================================================================
// Volume diagnostics
// ============================================================================

/// Conditions reporting `False` with a message, excluding benign types.
pub fn failed_conditions(volume: &Volume) -> Vec<&Condition> {
    volume
        .conditions
        .iter()
        .filter(|c| !BENIGN_CONDITIONS.contains(&c.condition_type.as_str()))
        .filter(|c| c.is_false() && !c.message.is_empty())
        .collect()
}

/// Whether a volume needs attention.
pub fn volume_has_issue(volume: &Volume) -> bool {
    let unhealthy_attached =
        volume.state == VolumeState::Attached && volume.robustness.is_unhealthy();
    let bad_state = matches!(volume.state, VolumeState::Detached | VolumeState::Error);
    unhealthy_attached || bad_state || !failed_conditions(volume).is_empty()
}

fn finding(volume: &Volume, code: &str, kind: IssueKind, issue: String, remediation: String) -> DiagnosticFinding {
    DiagnosticFinding {
        volume: volume.name.clone(),
        state: volume.state.clone(),
        robustness: volume.robustness.clone(),
        replica_status: volume.replica_status(),
        rule_code: RuleCode::new(code),
        kind,
        issue,
        remediation,
        pool: None,
    }
}

fn state_remediation(volume: &Volume) -> &'static str {
    if volume.state == VolumeState::Detached {
        "Volume is detached. Attach the volume to a workload or delete it if no longer needed."
    } else if volume.robustness == Robustness::Unknown {
        "Volume robustness is unknown. This may be a transient state. If it persists, try restarting the Longhorn manager."
    } else if volume.state == VolumeState::Error {
        "Volume is in error state. Check Longhorn manager logs for details."
    } else {
        UNCLASSIFIED_REMEDIATION
    }
}

/// Diagnose one volume against the rule table.
///
/// `disks` must be every known disk, not a filtered subset: remediation for
/// tag mismatches reasons about the whole cluster's disk pool.
pub fn diagnose_volume(
    volume: &Volume,
    disks: &[Disk],
    rules: &[Box<dyn DiagnosticRule>],
) -> Vec<DiagnosticFinding> {
    if !volume_has_issue(volume) {
        return Vec::new();
    }

    let failed = failed_conditions(volume);
    if failed.is_empty() {
        return vec![finding(
            volume,
            codes::STATE,
            IssueKind::State,
            NO_SPECIFIC_CONDITION.to_string(),
            state_remediation(volume).to_string(),
        )];
    }

    failed
        .into_iter()
        .map(|condition| {
            let issue = format!("{}: {}", condition.condition_type, condition.message);
            match rules::classify(rules, &condition.message) {
                Some(rule) => {
                    let remediation = rule.remediation(&RuleContext {
                        volume,
                        condition,
                        disks,
                    });
                    let mut f = finding(volume, rule.code(), rule.kind(), issue, remediation.text);
                    f.pool = remediation.pool;
                    f
                }
                None => finding(
                    volume,
                    codes::UNCLASSIFIED,
                    IssueKind::Unclassified,
                    issue,
                    UNCLASSIFIED_REMEDIATION.to_string(),
                ),
            }
        })
        .collect()
}

/// Diagnose every volume, dropping findings whose rule code is ignored.
pub fn diagnose_volumes(
    volumes: &[Volume],
    disks: &[Disk],
    rules: &[Box<dyn DiagnosticRule>],
    config: &InspectConfig,
) -> Vec<DiagnosticFinding> {
    volumes
        .iter()
        .flat_map(|v| diagnose_volume(v, disks, rules))
        .filter(|f| !config.should_ignore_rule(f.rule_code.as_str()))
        .collect()
}

// ============================================================================
// Disk diagnostics
// ============================================================================

/// Find disks with missing tags, missing status or failed conditions.
///
/// Works on raw node documents so disks without status are reported rather
/// than skipped. The tag filter does not apply: an untagged disk is exactly
/// what this check looks for.
pub fn diagnose_disks(nodes: &[Value], filters: &StorageFilters) -> Vec<DiskIssue> {
    let mut issues = Vec::new();

    for node in nodes {
        let node_name = object_name(node);
        if !filters.matches_node(&node_name) {
            continue;
        }
        let Some((specs, statuses)) = node_disk_maps(node) else {
            continue;
        };

        for (disk_name, spec) in specs {
            if !spec.is_object() || !filters.matches_disk(disk_name) {
                continue;
            }
            let issue = |kind: DiskIssueKind, message: String| DiskIssue {
                node_name: node_name.clone(),
                disk_name: disk_name.clone(),
                kind,
                message,
            };

            if lookup(spec, &["tags"]).is_none_or(Value::is_null) {
                issues.push(issue(DiskIssueKind::NoTags, "No tags defined".to_string()));
                continue;
            }

            let Some(status) = statuses.get(disk_name) else {
                issues.push(issue(
                    DiskIssueKind::NoStatus,
                    "No disk status available".to_string(),
                ));
                continue;
            };

            let conditions = nested_slice(status, &["conditions"])
                .map(|c| parse_conditions(c))
                .unwrap_or_default();
            for condition in conditions {
                if condition.is_false() && !condition.condition_type.is_empty() {
                    let message = format!("{}: {}", condition.condition_type, condition.reason);
                    issues.push(issue(
                        DiskIssueKind::ConditionFalse {
                            condition: condition.condition_type,
                            reason: condition.reason,
                        },
                        message,
                    ));
                }
            }
        }
    }

    issues
}

// ============================================================================
// Deletion safety
// ============================================================================

/// Why a volume is safe to delete, if it is.
///
/// A volume exposed through a Released or Failed PV, or a detached volume no
/// PV refers to, has no consumer left.
pub fn evaluate_deletion(
    volume: &Volume,
    relationships: &BTreeMap<String, PersistentVolumeRecord>,
) -> Option<DeletionReason> {
    match relationships.get(&volume.name) {
        Some(pv) if pv.phase == "Released" => Some(DeletionReason::PvReleased),
        Some(pv) if pv.phase == "Failed" => Some(DeletionReason::PvFailed),
        Some(_) => None,
        None if volume.state == VolumeState::Detached => Some(DeletionReason::DetachedUnbound),
        None => None,
    }
}

/// Record a deletion verdict on every volume.
pub fn apply_deletion_verdicts(
    volumes: &mut [Volume],
    relationships: &BTreeMap<String, PersistentVolumeRecord>,
) {
    for volume in volumes {
        volume.deletion = evaluate_deletion(volume, relationships);
    }
}

/// Command that deletes a Longhorn volume.
pub fn delete_command(namespace: &str, volume: &str) -> String {
    format!("kubectl -n {} delete volumes.longhorn.io {}", namespace, volume)
}

/// Candidates for volumes already carrying a deletion verdict.
pub fn deletion_candidates(
    volumes: &[Volume],
    relationships: &BTreeMap<String, PersistentVolumeRecord>,
    namespace: &str,
) -> Vec<DeletionCandidate> {
    volumes
        .iter()
        .filter_map(|v| {
            let reason = v.deletion?;
            Some(DeletionCandidate {
                volume: v.name.clone(),
                reason,
                pv_phase: relationships.get(&v.name).map(|pv| pv.phase.clone()),
                command: delete_command(namespace, &v.name),
            })
        })
        .collect()
}

/// Candidates derived from PV phases alone.
///
/// Used when volumes could not be listed: Released and Failed PVs still
/// identify deletable volumes, detached-and-unbound ones cannot be seen.
pub fn deletion_candidates_from_pvs(
    relationships: &BTreeMap<String, PersistentVolumeRecord>,
    namespace: &str,
) -> Vec<DeletionCandidate> {
    relationships
        .iter()
        .filter_map(|(volume, pv)| {
            let reason = match pv.phase.as_str() {
                "Released" => DeletionReason::PvReleased,
                "Failed" => DeletionReason::PvFailed,
                _ => return None,
            };
            Some(DeletionCandidate {
                volume: volume.clone(),
                reason,
                pv_phase: Some(pv.phase.clone()),
                command: delete_command(namespace, volume),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::storage::rules::all_rules;
    use crate::analyzer::storage::types::ByteSize;
    use serde_json::json;

    fn condition(kind: &str, status: &str, message: &str) -> Condition {
        Condition {
            condition_type: kind.to_string(),
            status: status.to_string(),
            message: message.to_string(),
            ..Default::default()
        }
    }

    fn volume(state: VolumeState, robustness: Robustness) -> Volume {
        Volume {
            name: "v1".to_string(),
            state,
            robustness,
            desired_replicas: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_healthy_attached_volume_has_no_issue() {
        let v = volume(VolumeState::Attached, Robustness::Healthy);
        assert!(!volume_has_issue(&v));
        assert!(diagnose_volume(&v, &[], &all_rules()).is_empty());
    }

    #[test]
    fn test_benign_conditions_are_ignored() {
        let mut v = volume(VolumeState::Attached, Robustness::Healthy);
        v.conditions = vec![
            condition("Restore", "False", "restore pending"),
            condition("WaitForBackingImage", "False", "waiting"),
            condition("Scheduled", "False", ""),
        ];
        assert!(!volume_has_issue(&v));
    }

    #[test]
    fn test_tag_mismatch_with_no_tagged_disks() {
        let mut v = volume(VolumeState::Detached, Robustness::Unknown);
        v.disk_selector = vec!["fast".to_string()];
        v.conditions = vec![condition(
            "Scheduled",
            "False",
            "replica scheduling failed: no disk matches requirements",
        )];
        let disks = vec![Disk {
            tags: vec!["slow".to_string()],
            storage_available: ByteSize::TB,
            ..Default::default()
        }];

        let findings = diagnose_volume(&v, &disks, &all_rules());
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.kind, IssueKind::TagMismatch);
        assert_eq!(f.rule_code.as_str(), codes::DISK_TAG_MISMATCH);
        assert_eq!(f.pool.unwrap().disk_count, 0);
        assert!(f.remediation.contains("fast"));
        assert_eq!(
            f.issue,
            "Scheduled: replica scheduling failed: no disk matches requirements"
        );
    }

    #[test]
    fn test_unrecognised_condition_is_kept() {
        let mut v = volume(VolumeState::Attached, Robustness::Healthy);
        v.conditions = vec![condition("TooManySnapshots", "False", "snapshot limit near")];
        let findings = diagnose_volume(&v, &[], &all_rules());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, IssueKind::Unclassified);
        assert_eq!(findings[0].remediation, UNCLASSIFIED_REMEDIATION);
    }

    #[test]
    fn test_each_failed_condition_yields_a_finding() {
        let mut v = volume(VolumeState::Attached, Robustness::Degraded);
        v.conditions = vec![
            condition("Scheduled", "False", "insufficient storage"),
            condition("Attached", "False", "error attaching volume"),
            condition("Ready", "True", "fine"),
        ];
        let kinds: Vec<_> = diagnose_volume(&v, &[], &all_rules())
            .into_iter()
            .map(|f| f.kind)
            .collect();
        assert_eq!(kinds, vec![IssueKind::InsufficientStorage, IssueKind::AttachError]);
    }

    #[test]
    fn test_state_fallback_remediation() {
        let cases = [
            (VolumeState::Detached, Robustness::Unknown, "Volume is detached"),
            (VolumeState::Attached, Robustness::Unknown, "Volume robustness is unknown"),
            (VolumeState::Error, Robustness::Faulted, "Volume is in error state"),
            (VolumeState::Attached, Robustness::Degraded, "Unknown issue"),
        ];
        for (state, robustness, expected) in cases {
            let v = volume(state, robustness);
            let findings = diagnose_volume(&v, &[], &all_rules());
            assert_eq!(findings.len(), 1);
            assert_eq!(findings[0].issue, NO_SPECIFIC_CONDITION);
            assert_eq!(findings[0].kind, IssueKind::State);
            assert!(findings[0].remediation.starts_with(expected), "{expected}");
        }
    }

    #[test]
    fn test_diagnose_volumes_respects_ignored_rules() {
        let v = volume(VolumeState::Detached, Robustness::Unknown);
        let all = diagnose_volumes(std::slice::from_ref(&v), &[], &all_rules(), &InspectConfig::new());
        assert_eq!(all.len(), 1);
        let config = InspectConfig::new().ignore_rule(codes::STATE);
        let ignored = diagnose_volumes(&[v], &[], &all_rules(), &config);
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_diagnose_disks() {
        let nodes = vec![json!({
            "metadata": {"name": "n1"},
            "spec": {"disks": {
                "untagged": {"path": "/a"},
                "nulltags": {"path": "/b", "tags": null},
                "nostatus": {"path": "/c", "tags": []},
                "failing": {"path": "/d", "tags": ["fast"]},
                "ok": {"path": "/e", "tags": ["fast"]}
            }},
            "status": {"diskStatus": {
                "failing": {"conditions": [
                    {"type": "Schedulable", "status": "False", "reason": "DiskPressure"},
                    {"type": "", "status": "False", "reason": "ignored"},
                    {"type": "Ready", "status": "True", "reason": ""}
                ]},
                "ok": {"conditions": []}
            }}
        })];

        let issues = diagnose_disks(&nodes, &StorageFilters::default());
        let mut summary: Vec<_> = issues
            .iter()
            .map(|i| format!("{}:{}", i.disk_name, i.message))
            .collect();
        summary.sort();
        assert_eq!(
            summary,
            vec![
                "failing:Schedulable: DiskPressure",
                "nostatus:No disk status available",
                "nulltags:No tags defined",
                "untagged:No tags defined",
            ]
        );
    }

    #[test]
    fn test_diagnose_disks_skips_nodes_without_status_map() {
        let nodes = vec![json!({
            "metadata": {"name": "n1"},
            "spec": {"disks": {"untagged": {"path": "/a"}}}
        })];
        assert!(diagnose_disks(&nodes, &StorageFilters::default()).is_empty());
    }

    fn pv(phase: &str) -> PersistentVolumeRecord {
        PersistentVolumeRecord {
            name: "pv1".to_string(),
            phase: phase.to_string(),
            volume_handle: "v1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_evaluate_deletion() {
        let attached = volume(VolumeState::Attached, Robustness::Healthy);
        let detached = volume(VolumeState::Detached, Robustness::Unknown);
        let empty = BTreeMap::new();

        assert_eq!(evaluate_deletion(&attached, &empty), None);
        assert_eq!(
            evaluate_deletion(&detached, &empty),
            Some(DeletionReason::DetachedUnbound)
        );

        let bound = BTreeMap::from([("v1".to_string(), pv("Bound"))]);
        assert_eq!(evaluate_deletion(&detached, &bound), None);

        let failed = BTreeMap::from([("v1".to_string(), pv("Failed"))]);
        assert_eq!(
            evaluate_deletion(&attached, &failed),
            Some(DeletionReason::PvFailed)
        );
    }

    #[test]
    fn test_toggling_pv_phase_flips_verdict_and_reason() {
        let v = volume(VolumeState::Attached, Robustness::Healthy);
        let bound = BTreeMap::from([("v1".to_string(), pv("Bound"))]);
        let released = BTreeMap::from([("v1".to_string(), pv("Released"))]);

        let before = evaluate_deletion(&v, &bound);
        let after = evaluate_deletion(&v, &released);
        assert!(before.is_none());
        assert_eq!(after, Some(DeletionReason::PvReleased));
        assert_ne!(before.map(|r| r.message()), after.map(|r| r.message()));
    }

    #[test]
    fn test_deletion_candidates_carry_command() {
        let mut volumes = vec![
            volume(VolumeState::Attached, Robustness::Healthy),
            Volume {
                name: "v2".to_string(),
                state: VolumeState::Detached,
                ..Default::default()
            },
        ];
        let relationships = BTreeMap::from([("v1".to_string(), pv("Released"))]);
        apply_deletion_verdicts(&mut volumes, &relationships);

        let candidates = deletion_candidates(&volumes, &relationships, "longhorn-system");
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0].command,
            "kubectl -n longhorn-system delete volumes.longhorn.io v1"
        );
        assert_eq!(candidates[0].pv_phase.as_deref(), Some("Released"));
        assert_eq!(candidates[1].reason, DeletionReason::DetachedUnbound);
        assert_eq!(candidates[1].pv_phase, None);
    }

    #[test]
    fn test_deletion_candidates_from_pvs() {
        let relationships = BTreeMap::from([
            ("v1".to_string(), pv("Released")),
            ("v2".to_string(), pv("Bound")),
            ("v3".to_string(), pv("Failed")),
        ]);
        let candidates = deletion_candidates_from_pvs(&relationships, "lh");
        let names: Vec<_> = candidates.iter().map(|c| c.volume.as_str()).collect();
        assert_eq!(names, vec!["v1", "v3"]);
    }
}
