//! LH-VOL-003: No node satisfies the volume's node selector.

use super::{DiagnosticRule, Remediation, RuleContext, codes};
use crate::analyzer::storage::types::IssueKind;

/// Rule: node selector tags not fulfilled.
pub struct NodeTagMismatchRule;

impl DiagnosticRule for NodeTagMismatchRule {
    fn code(&self) -> &'static str {
        codes::NODE_TAG_MISMATCH
    }

    fn kind(&self) -> IssueKind {
        IssueKind::NodeTagMismatch
    }

    fn patterns(&self) -> &'static [&'static str] {
        &["specified node tag", "node tag"]
    }

    fn remediation(&self, ctx: &RuleContext<'_>) -> Remediation {
        Remediation::text(format!(
            "Node selector tags not fulfilled: {}. Add these tags to appropriate nodes or modify volume to use different node selector.",
            ctx.volume.node_selector.join(",")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::storage::types::{Condition, Volume};

    #[test]
    fn test_remediation_names_node_selector() {
        let volume = Volume {
            node_selector: vec!["storage".to_string(), "zone-a".to_string()],
            ..Default::default()
        };
        let condition = Condition::default();
        let r = NodeTagMismatchRule.remediation(&RuleContext {
            volume: &volume,
            condition: &condition,
            disks: &[],
        });
        assert!(r.text.contains("storage,zone-a"));
        assert!(r.pool.is_none());
    }
}
