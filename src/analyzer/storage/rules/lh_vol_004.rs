//! LH-VOL-004: Volume creation failed.

use super::{DiagnosticRule, Remediation, RuleContext, codes};
use crate::analyzer::storage::types::IssueKind;

/// Rule: error creating volume.
pub struct CreationErrorRule;

impl DiagnosticRule for CreationErrorRule {
    fn code(&self) -> &'static str {
        codes::CREATION_ERROR
    }

    fn kind(&self) -> IssueKind {
        IssueKind::CreationError
    }

    fn patterns(&self) -> &'static [&'static str] {
        &["error creating", "create volume error"]
    }

    fn remediation(&self, _ctx: &RuleContext<'_>) -> Remediation {
        Remediation::text(
            "Error during volume creation. Check Longhorn manager logs for details. Try deleting and recreating the volume.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::storage::types::{Condition, Volume};

    #[test]
    fn test_identity() {
        assert_eq!(CreationErrorRule.code(), "LH-VOL-004");
        assert_eq!(CreationErrorRule.kind(), IssueKind::CreationError);
    }

    #[test]
    fn test_matches() {
        assert!(CreationErrorRule.matches("error creating engine process"));
        assert!(CreationErrorRule.matches("create volume error: timeout"));
        assert!(!CreationErrorRule.matches("error attaching"));
    }

    #[test]
    fn test_remediation() {
        let volume = Volume::default();
        let condition = Condition::default();
        let r = CreationErrorRule.remediation(&RuleContext {
            volume: &volume,
            condition: &condition,
            disks: &[],
        });
        assert_eq!(
            r.text,
            "Error during volume creation. Check Longhorn manager logs for details. Try deleting and recreating the volume."
        );
        assert!(r.pool.is_none());
    }
}
