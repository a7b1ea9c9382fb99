//! Classification rules for failed volume conditions.
//!
//! Longhorn reports scheduling and lifecycle failures as free-text condition
//! messages. Each rule owns the message fragments it recognises and the
//! remediation it produces, so a wording change upstream touches exactly one
//! rule. Rules are evaluated in table order and the first match wins.

mod lh_vol_001;
mod lh_vol_002;
mod lh_vol_003;
mod lh_vol_004;
mod lh_vol_005;

use crate::analyzer::storage::types::{Condition, Disk, DiskPool, IssueKind, Volume};

// ============================================================================
// Rule Trait
// ============================================================================

/// Trait for condition classification rules.
pub trait DiagnosticRule: Send + Sync {
    /// Get the rule code (e.g., "LH-VOL-001").
    fn code(&self) -> &'static str;

    /// Issue kind reported for matching conditions.
    fn kind(&self) -> IssueKind;

    /// Message fragments this rule recognises. Matching is case-sensitive.
    fn patterns(&self) -> &'static [&'static str];

    /// Check whether a condition message belongs to this rule.
    fn matches(&self, message: &str) -> bool {
        self.patterns().iter().any(|p| message.contains(p))
    }

    /// Build the remediation for a matching condition.
    fn remediation(&self, ctx: &RuleContext<'_>) -> Remediation;
}

/// Context for rule evaluation.
pub struct RuleContext<'a> {
    pub volume: &'a Volume,
    pub condition: &'a Condition,
    /// Every known disk, unfiltered.
    pub disks: &'a [Disk],
}

/// Remediation text plus any evidence gathered while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Remediation {
    pub text: String,
    pub pool: Option<DiskPool>,
}

impl Remediation {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pool: None,
        }
    }
}

// ============================================================================
// Rule Codes
// ============================================================================

/// Rule code constants.
pub mod codes {
    pub const UNCLASSIFIED: &str = "LH-VOL-000";
    pub const DISK_TAG_MISMATCH: &str = "LH-VOL-001";
    pub const INSUFFICIENT_STORAGE: &str = "LH-VOL-002";
    pub const NODE_TAG_MISMATCH: &str = "LH-VOL-003";
    pub const CREATION_ERROR: &str = "LH-VOL-004";
    pub const ATTACH_ERROR: &str = "LH-VOL-005";
    /// Unhealthy state with no failed condition to explain it.
    pub const STATE: &str = "LH-VOL-006";
}

/// Remediation for a failed condition no rule recognises.
pub const UNCLASSIFIED_REMEDIATION: &str = "Unknown issue, check Longhorn logs for more details";

// ============================================================================
// Rule Registry
// ============================================================================

/// Get all classification rules in evaluation order.
pub fn all_rules() -> Vec<Box<dyn DiagnosticRule>> {
    vec![
        Box::new(lh_vol_001::DiskTagMismatchRule),
        Box::new(lh_vol_002::InsufficientStorageRule),
        Box::new(lh_vol_003::NodeTagMismatchRule),
        Box::new(lh_vol_004::CreationErrorRule),
        Box::new(lh_vol_005::AttachErrorRule),
    ]
}

/// First rule in `rules` matching `message`.
pub fn classify<'r>(rules: &'r [Box<dyn DiagnosticRule>], message: &str) -> Option<&'r dyn DiagnosticRule> {
    rules.iter().find(|r| r.matches(message)).map(|r| &**r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_first_match_wins() {
        let rules = all_rules();
        // Contains both the tag and storage fragments; tag rule is earlier.
        let rule = classify(&rules, "tags not fulfilled; insufficient storage").unwrap();
        assert_eq!(rule.code(), codes::DISK_TAG_MISMATCH);
    }

    #[test]
    fn test_classify_each_pattern() {
        let rules = all_rules();
        let cases = [
            ("replica scheduling failed: tags not fulfilled", codes::DISK_TAG_MISMATCH),
            ("no disk matches requirements", codes::DISK_TAG_MISMATCH),
            ("insufficient storage", codes::INSUFFICIENT_STORAGE),
            ("specified node tag missing", codes::NODE_TAG_MISMATCH),
            ("node tag foo", codes::NODE_TAG_MISMATCH),
            ("error creating engine", codes::CREATION_ERROR),
            ("create volume error", codes::CREATION_ERROR),
            ("error attaching to node", codes::ATTACH_ERROR),
        ];
        for (message, code) in cases {
            assert_eq!(classify(&rules, message).map(|r| r.code()), Some(code), "{message}");
        }
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        let rules = all_rules();
        assert!(classify(&rules, "Insufficient Storage").is_none());
        assert!(classify(&rules, "something unexpected").is_none());
    }

    #[test]
    fn test_rule_codes_unique() {
        let rules = all_rules();
        let mut seen: Vec<_> = rules.iter().map(|r| r.code()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), rules.len());
        for rule in &rules {
            assert!(!rule.patterns().is_empty());
        }
    }
}
