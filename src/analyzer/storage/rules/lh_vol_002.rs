//! LH-VOL-002: Not enough storage to schedule a replica.

use super::{DiagnosticRule, Remediation, RuleContext, codes};
use crate::analyzer::storage::types::IssueKind;

/// Rule: insufficient storage.
pub struct InsufficientStorageRule;

impl DiagnosticRule for InsufficientStorageRule {
    fn code(&self) -> &'static str {
        codes::INSUFFICIENT_STORAGE
    }

    fn kind(&self) -> IssueKind {
        IssueKind::InsufficientStorage
    }

    fn patterns(&self) -> &'static [&'static str] {
        &["insufficient storage"]
    }

    fn remediation(&self, ctx: &RuleContext<'_>) -> Remediation {
        Remediation::text(format!(
            "Not enough storage space available for volume size {}. Extend storage on disks with appropriate tags or reduce volume size.",
            ctx.volume.size
        ))
    }
}
