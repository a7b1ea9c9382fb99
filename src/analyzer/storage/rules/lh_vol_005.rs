//! LH-VOL-005: Volume attachment failed.

use super::{DiagnosticRule, Remediation, RuleContext, codes};
use crate::analyzer::storage::types::IssueKind;

/// Rule: error attaching volume.
pub struct AttachErrorRule;

impl DiagnosticRule for AttachErrorRule {
    fn code(&self) -> &'static str {
        codes::ATTACH_ERROR
    }

    fn kind(&self) -> IssueKind {
        IssueKind::AttachError
    }

    fn patterns(&self) -> &'static [&'static str] {
        &["error attaching"]
    }

    fn remediation(&self, _ctx: &RuleContext<'_>) -> Remediation {
        Remediation::text(
            "Error attaching volume. Check that the node has access to the storage. Try restarting the Longhorn manager on the node.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::storage::types::{Condition, Volume};

    #[test]
    fn test_identity() {
        assert_eq!(AttachErrorRule.code(), "LH-VOL-005");
        assert_eq!(AttachErrorRule.kind(), IssueKind::AttachError);
    }

    #[test]
    fn test_matches() {
        assert!(AttachErrorRule.matches("error attaching volume to node-2"));
        assert!(!AttachErrorRule.matches("Error Attaching"));
        assert!(!AttachErrorRule.matches("create volume error"));
    }

    #[test]
    fn test_remediation() {
        let volume = Volume::default();
        let condition = Condition::default();
        let r = AttachErrorRule.remediation(&RuleContext {
            volume: &volume,
            condition: &condition,
            disks: &[],
        });
        assert_eq!(
            r.text,
            "Error attaching volume. Check that the node has access to the storage. Try restarting the Longhorn manager on the node."
        );
        assert!(r.pool.is_none());
    }
}
