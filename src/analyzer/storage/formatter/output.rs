//! Output formats and the top-level report layouts.

use super::sections::{self, Painter, Tone};
use crate::analyzer::storage::types::StorageReport;
use serde::{Deserialize, Serialize};

// ============================================================================
// Output Format
// ============================================================================

/// Output format for storage reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Sectioned tables (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text summary
    Summary,
}

impl OutputFormat {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(Self::Table),
            "json" => Some(Self::Json),
            "yaml" => Some(Self::Yaml),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

/// Presentation toggles for the table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenterOptions {
    /// Emit ANSI colours
    pub color: bool,
    /// Borderless tables, no section descriptions
    pub compact: bool,
    /// Add the attached-node column to the volume table
    pub detailed: bool,
    pub show_replicas: bool,
    pub show_relationships: bool,
}

impl Default for PresenterOptions {
    fn default() -> Self {
        Self {
            color: true,
            compact: false,
            detailed: false,
            show_replicas: true,
            show_relationships: true,
        }
    }
}

impl PresenterOptions {
    /// Options with colour turned off, for files and pipes.
    pub fn plain(self) -> Self {
        Self {
            color: false,
            ..self
        }
    }
}

// ============================================================================
// Formatting Functions
// ============================================================================

/// Format a storage report to string.
pub fn format_report_to_string(
    report: &StorageReport,
    format: OutputFormat,
    options: &PresenterOptions,
) -> String {
    match format {
        OutputFormat::Table => format_table(report, options),
        OutputFormat::Json => format_json(report),
        OutputFormat::Yaml => format_yaml(report),
        OutputFormat::Summary => format_summary(report),
    }
}

/// Format and print a storage report.
pub fn format_report(report: &StorageReport, format: OutputFormat, options: &PresenterOptions) {
    println!("{}", format_report_to_string(report, format, options));
}

// ============================================================================
// Table Format
// ============================================================================

fn format_table(report: &StorageReport, options: &PresenterOptions) -> String {
    let painter = Painter::new(options);
    let mut output = sections::header(&painter);

    output.push_str(&sections::collection_errors(report, &painter, options));
    output.push_str(&sections::disks(report, &painter, options));
    output.push_str(&sections::volumes(report, &painter, options));
    if options.show_replicas {
        output.push_str(&sections::replicas(report, &painter, options));
    }
    if options.show_relationships {
        output.push_str(&sections::relationships(report, &painter, options));
    }
    output.push_str(&sections::deletion_candidates(report, &painter, options));
    output.push_str(&sections::disk_issues(report, &painter, options));
    output.push_str(&sections::volume_findings(report, &painter, options));
    output.push_str(&sections::volumes_by_disk_tag(report, &painter, options));

    output
}

/// Cleanup view: deletion candidates and their commands only.
pub fn format_cleanup(report: &StorageReport, options: &PresenterOptions) -> String {
    let painter = Painter::new(options);
    let mut output = sections::collection_errors(report, &painter, options);

    if report.deletion_candidates.is_empty() {
        output.push_str(&painter.paint("No volumes are safe to delete", Tone::Green));
        output.push('\n');
    } else {
        output.push_str(&sections::deletion_candidates(report, &painter, options));
    }
    output
}

// ============================================================================
// JSON Format
// ============================================================================

fn format_json(report: &StorageReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

// ============================================================================
// YAML Format
// ============================================================================

fn format_yaml(report: &StorageReport) -> String {
    serde_yaml::to_string(report).unwrap_or_else(|_| "".to_string())
}

// ============================================================================
// Summary Format
// ============================================================================

fn format_summary(report: &StorageReport) -> String {
    let s = &report.summary;
    let mut output = String::new();

    output.push_str("▶ LONGHORN STORAGE SUMMARY\n");
    output.push_str("──────────────────────────────────────────────────\n");
    output.push_str(&format!(
        "│ Disks: {} ({} total, {} available)\n",
        s.disks, s.total_capacity, s.total_available
    ));
    output.push_str(&format!(
        "│ Volumes: {} ({} healthy, {} degraded, {} faulted, {} detached)\n",
        s.volumes, s.healthy, s.degraded, s.faulted, s.detached
    ));
    output.push_str(&format!("│ PersistentVolumes: {}\n", s.persistent_volumes));
    output.push_str(&format!(
        "│ Issues: {} volume, {} disk\n",
        s.volume_findings, s.disk_issues
    ));
    output.push_str(&format!("│ Safe to delete: {}\n", s.safe_to_delete));
    if !report.collection_errors.is_empty() {
        output.push_str(&format!(
            "│ Collection errors: {}\n",
            report.collection_errors.len()
        ));
    }
    output.push_str(&format!(
        "│ Analysis Time: {}ms\n",
        report.metadata.duration_ms
    ));
    output.push_str("──────────────────────────────────────────────────\n");

    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::storage::types::{
        ByteSize, DeletionCandidate, DeletionReason, Disk, Robustness, Volume, VolumeState,
    };

    fn plain() -> PresenterOptions {
        PresenterOptions::default().plain()
    }

    fn sample_report() -> StorageReport {
        let mut report = StorageReport::new("longhorn-system");
        report.disks.push(Disk {
            node_name: "node-1".to_string(),
            disk_name: "default".to_string(),
            tags: vec!["fast".to_string()],
            storage_maximum: ByteSize::GB,
            storage_available: ByteSize(ByteSize::GB.0 / 4.0),
            percent_used: 75.0,
            ..Default::default()
        });
        report.volumes.push(Volume {
            name: "pvc-1".to_string(),
            size: ByteSize::GB,
            state: VolumeState::Detached,
            robustness: Robustness::Unknown,
            node: "node-1".to_string(),
            desired_replicas: 2,
            deletion: Some(DeletionReason::DetachedUnbound),
            ..Default::default()
        });
        report.deletion_candidates.push(DeletionCandidate {
            volume: "pvc-1".to_string(),
            reason: DeletionReason::DetachedUnbound,
            pv_phase: None,
            command: "kubectl -n longhorn-system delete volumes.longhorn.io pvc-1".to_string(),
        });
        report.update_summary();
        report
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("table"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("yaml"), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::parse("summary"), Some(OutputFormat::Summary));
        assert_eq!(OutputFormat::parse("invalid"), None);
    }

    #[test]
    fn test_format_json() {
        let json = format_json(&sample_report());
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"deletion_candidates\""));
        assert!(json.contains("\"detached_unbound\""));
    }

    #[test]
    fn test_format_yaml() {
        let yaml = format_yaml(&sample_report());
        assert!(yaml.contains("volumes:"));
        assert!(yaml.contains("pvc-1"));
    }

    #[test]
    fn test_format_summary() {
        let summary = format_summary(&sample_report());
        assert!(summary.contains("LONGHORN STORAGE SUMMARY"));
        assert!(summary.contains("Volumes: 1"));
        assert!(summary.contains("Safe to delete: 1"));
    }

    #[test]
    fn test_format_table_sections() {
        let table = format_table(&sample_report(), &plain());
        for title in [
            "LONGHORN STORAGE MONITOR",
            "DISK INFORMATION",
            "VOLUME INFORMATION",
            "REPLICA INFORMATION",
            "KUBERNETES RESOURCE RELATIONSHIPS",
            "VOLUMES SAFE TO DELETE",
            "DISKS WITH ISSUES",
            "VOLUMES WITH ISSUES",
            "VOLUMES BY DISK TAG",
        ] {
            assert!(table.contains(title), "missing {title}");
        }
        assert!(table.contains("75.0%"));
        assert!(table.contains("Yes - Volume is detached and not bound to any PV"));
        assert!(table.contains("No disk issues found"));
        assert!(table.contains("No Kubernetes resources found using Longhorn volumes"));
        assert!(!table.contains('\u{1b}'));
    }

    #[test]
    fn test_format_table_optional_sections() {
        let options = PresenterOptions {
            show_replicas: false,
            show_relationships: false,
            ..plain()
        };
        let table = format_table(&sample_report(), &options);
        assert!(!table.contains("REPLICA INFORMATION"));
        assert!(!table.contains("KUBERNETES RESOURCE RELATIONSHIPS"));
    }

    #[test]
    fn test_detailed_adds_node_column() {
        let basic = format_table(&sample_report(), &plain());
        let detailed = format_table(
            &sample_report(),
            &PresenterOptions {
                detailed: true,
                ..plain()
            },
        );
        assert!(detailed.matches("node-1").count() > basic.matches("node-1").count());
    }

    #[test]
    fn test_format_cleanup() {
        let output = format_cleanup(&sample_report(), &plain());
        assert!(output.contains("kubectl -n longhorn-system delete volumes.longhorn.io pvc-1"));

        let empty = format_cleanup(&StorageReport::new("longhorn-system"), &plain());
        assert!(empty.contains("No volumes are safe to delete"));
    }
}
