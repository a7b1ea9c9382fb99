//! Configuration for a storage inspection pass.

use serde::{Deserialize, Serialize};

/// Namespace Longhorn is installed into by default.
pub const DEFAULT_NAMESPACE: &str = "longhorn-system";

/// CSI driver name identifying Longhorn-backed PersistentVolumes.
pub const DEFAULT_DRIVER: &str = "driver.longhorn.io";

/// Exact-match filters applied while collecting resources.
///
/// Each field is an independent predicate; `None` means no constraint. Set
/// filters are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFilters {
    pub node: Option<String>,
    pub disk: Option<String>,
    pub volume: Option<String>,
    pub disk_tag: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl StorageFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: Option<String>) -> Self {
        self.node = non_empty(node);
        self
    }

    pub fn with_disk(mut self, disk: Option<String>) -> Self {
        self.disk = non_empty(disk);
        self
    }

    pub fn with_volume(mut self, volume: Option<String>) -> Self {
        self.volume = non_empty(volume);
        self
    }

    pub fn with_disk_tag(mut self, tag: Option<String>) -> Self {
        self.disk_tag = non_empty(tag);
        self
    }

    pub fn matches_node(&self, node: &str) -> bool {
        self.node.as_deref().is_none_or(|n| n == node)
    }

    pub fn matches_disk(&self, disk: &str) -> bool {
        self.disk.as_deref().is_none_or(|d| d == disk)
    }

    pub fn matches_volume(&self, volume: &str) -> bool {
        self.volume.as_deref().is_none_or(|v| v == volume)
    }

    /// True when the tag filter is unset or present in `tags`.
    pub fn matches_tags(&self, tags: &[String]) -> bool {
        self.disk_tag
            .as_deref()
            .is_none_or(|t| tags.iter().any(|tag| tag == t))
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_none() && self.disk.is_none() && self.volume.is_none() && self.disk_tag.is_none()
    }
}

/// Configuration for storage inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectConfig {
    /// Namespace holding the Longhorn CRDs (default: longhorn-system)
    pub namespace: String,

    /// CSI driver name of Longhorn PVs (default: driver.longhorn.io)
    pub driver: String,

    /// Resource filters
    pub filters: StorageFilters,

    /// Diagnostic rules to skip (by rule code)
    pub ignore_rules: Vec<String>,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            driver: DEFAULT_DRIVER.to_string(),
            filters: StorageFilters::default(),
            ignore_rules: Vec::new(),
        }
    }
}

impl InspectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Longhorn namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the CSI driver name.
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    pub fn with_filters(mut self, filters: StorageFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Add a rule to ignore.
    pub fn ignore_rule(mut self, rule: impl Into<String>) -> Self {
        self.ignore_rules.push(rule.into());
        self
    }

    pub fn should_ignore_rule(&self, rule: &str) -> bool {
        self.ignore_rules.iter().any(|r| r == rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InspectConfig::default();
        assert_eq!(config.namespace, "longhorn-system");
        assert_eq!(config.driver, "driver.longhorn.io");
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_empty_filter_values_mean_no_constraint() {
        let filters = StorageFilters::new()
            .with_node(Some(String::new()))
            .with_disk_tag(Some(String::new()));
        assert!(filters.is_empty());
        assert!(filters.matches_node("anything"));
        assert!(filters.matches_tags(&[]));
    }

    #[test]
    fn test_filters_are_exact_match() {
        let filters = StorageFilters::new()
            .with_node(Some("node-1".to_string()))
            .with_disk_tag(Some("ssd".to_string()));
        assert!(filters.matches_node("node-1"));
        assert!(!filters.matches_node("node-10"));
        assert!(filters.matches_tags(&["hdd".to_string(), "ssd".to_string()]));
        assert!(!filters.matches_tags(&["SSD".to_string()]));
    }

    #[test]
    fn test_builder_pattern() {
        let config = InspectConfig::new()
            .with_namespace("storage")
            .with_driver("custom.csi")
            .ignore_rule("LH-VOL-000");
        assert_eq!(config.namespace, "storage");
        assert_eq!(config.driver, "custom.csi");
        assert!(config.should_ignore_rule("LH-VOL-000"));
        assert!(!config.should_ignore_rule("LH-VOL-001"));
    }
}
