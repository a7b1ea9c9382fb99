//! LH-VOL-001: No disk satisfies the volume's disk selector.

use super::{DiagnosticRule, Remediation, RuleContext, codes};
use crate::analyzer::storage::capacity::disk_pool_satisfying;
use crate::analyzer::storage::types::IssueKind;

/// Rule: disk tags not fulfilled.
///
/// The remediation depends on the pool of disks carrying every required tag:
/// none at all, too little free space, or enough of both (which points at
/// something outside the tag set).
pub struct DiskTagMismatchRule;

impl DiagnosticRule for DiskTagMismatchRule {
    fn code(&self) -> &'static str {
        codes::DISK_TAG_MISMATCH
    }

    fn kind(&self) -> IssueKind {
        IssueKind::TagMismatch
    }

    fn patterns(&self) -> &'static [&'static str] {
        &["tags not fulfilled", "no disk matches requirements"]
    }

    fn remediation(&self, ctx: &RuleContext<'_>) -> Remediation {
        let required = &ctx.volume.disk_selector;
        let pool = disk_pool_satisfying(required, ctx.disks);

        let text = if pool.disk_count == 0 {
            format!(
                "No disks found with required tags: {}. Add these tags to appropriate disks or modify volume to use different tags.",
                required.join(",")
            )
        } else if pool.total_available < ctx.volume.size {
            format!(
                "Insufficient space on disks with required tags. Available: {}, Required: {}. Extend disk space or reduce volume size.",
                pool.total_available, ctx.volume.size
            )
        } else {
            "Disk tags match but scheduling failed. Check node conditions and Longhorn manager logs."
                .to_string()
        };

        Remediation {
            text,
            pool: Some(pool),
        }
    }
}
