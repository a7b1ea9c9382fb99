//! Table sections of the report.

use super::output::PresenterOptions;
use crate::analyzer::storage::capacity::volumes_using_disk_tags;
use crate::analyzer::storage::types::{
    DiagnosticFinding, Robustness, StorageReport, Volume, VolumeState,
};
use colored::Colorize;
use prettytable::{Cell, Row, Table, format};

const RULE: &str = "══════════════════════════════════════════════════";

/// Styles a painter can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tone {
    Plain,
    Red,
    Yellow,
    Green,
    Blue,
    Cyan,
    Bold,
    Dim,
    /// Row highlight for deletable volumes
    Highlight,
}

/// Applies colours only when the options ask for them.
pub(super) struct Painter {
    color: bool,
}

impl Painter {
    pub(super) fn new(options: &PresenterOptions) -> Self {
        Self {
            color: options.color,
        }
    }

    pub(super) fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.color {
            return text.to_string();
        }
        match tone {
            Tone::Plain => text.to_string(),
            Tone::Red => text.red().to_string(),
            Tone::Yellow => text.yellow().to_string(),
            Tone::Green => text.green().to_string(),
            Tone::Blue => text.blue().to_string(),
            Tone::Cyan => text.cyan().to_string(),
            Tone::Bold => text.bold().to_string(),
            Tone::Dim => text.dimmed().to_string(),
            Tone::Highlight => text.black().on_green().bold().to_string(),
        }
    }
}

fn usage_tone(percent: f64) -> Tone {
    if percent > 80.0 {
        Tone::Red
    } else if percent > 60.0 {
        Tone::Yellow
    } else {
        Tone::Green
    }
}

fn state_tone(state: &VolumeState) -> Tone {
    match state {
        VolumeState::Detached => Tone::Yellow,
        VolumeState::Error => Tone::Red,
        _ => Tone::Green,
    }
}

fn robustness_tone(robustness: &Robustness) -> Tone {
    match robustness {
        Robustness::Degraded => Tone::Yellow,
        Robustness::Faulted | Robustness::Unknown => Tone::Red,
        _ => Tone::Green,
    }
}

fn pv_phase_tone(phase: &str) -> Tone {
    match phase {
        "Released" => Tone::Yellow,
        "Failed" => Tone::Red,
        _ => Tone::Green,
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(",")
    }
}

// ============================================================================
// Layout helpers
// ============================================================================

pub(super) fn header(painter: &Painter) -> String {
    let mut output = String::new();
    for line in [RULE, "            LONGHORN STORAGE MONITOR            ", RULE] {
        output.push_str(&painter.paint(line, Tone::Cyan));
        output.push('\n');
    }
    output
}

fn section_header(title: &str, description: &str, painter: &Painter, options: &PresenterOptions) -> String {
    let mut output = format!("\n{}\n", painter.paint(&format!("▌ {}", title), Tone::Bold));
    if !options.compact && !description.is_empty() {
        output.push_str(&painter.paint(description, Tone::Dim));
        output.push('\n');
    }
    output.push_str(&painter.paint(&"─".repeat(50), Tone::Cyan));
    output.push('\n');
    output
}

fn new_table(titles: &[&str], painter: &Painter, options: &PresenterOptions) -> Table {
    let mut table = Table::new();
    if options.compact {
        table.set_format(*format::consts::FORMAT_CLEAN);
    } else {
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    }
    table.set_titles(Row::new(
        titles
            .iter()
            .map(|t| Cell::new(&painter.paint(t, Tone::Yellow)))
            .collect(),
    ));
    table
}

fn row(cells: Vec<String>) -> Row {
    Row::new(cells.iter().map(|c| Cell::new(c)).collect())
}

// ============================================================================
// Sections
// ============================================================================

pub(super) fn collection_errors(
    report: &StorageReport,
    painter: &Painter,
    options: &PresenterOptions,
) -> String {
    if report.collection_errors.is_empty() {
        return String::new();
    }
    let mut output = section_header(
        "COLLECTION ERRORS",
        "These resources could not be listed; dependent sections are incomplete",
        painter,
        options,
    );
    for error in &report.collection_errors {
        let scope = match &error.namespace {
            Some(ns) => format!("{} in {}", error.resource, ns),
            None => error.resource.to_string(),
        };
        output.push_str(&format!("  {}: {}\n", painter.paint(&scope, Tone::Red), error.message));
    }
    output
}

pub(super) fn disks(report: &StorageReport, painter: &Painter, options: &PresenterOptions) -> String {
    let mut output = section_header(
        "DISK INFORMATION",
        "Capacity and usage of Longhorn disks",
        painter,
        options,
    );
    if report.disks.is_empty() {
        output.push_str("No disks found\n");
        return output;
    }

    let mut table = new_table(
        &["NODE", "DISK", "TAGS", "TYPE", "TOTAL", "AVAILABLE", "SCHEDULED", "USED%", "PATH"],
        painter,
        options,
    );
    for disk in &report.disks {
        let usage = format!("{:.1}%", disk.percent_used);
        table.add_row(row(vec![
            disk.node_name.clone(),
            disk.disk_name.clone(),
            painter.paint(&join_or_none(&disk.tags), Tone::Cyan),
            disk.disk_type.clone(),
            painter.paint(&disk.storage_maximum.to_string(), Tone::Blue),
            painter.paint(&disk.storage_available.to_string(), Tone::Green),
            painter.paint(&disk.storage_scheduled.to_string(), Tone::Yellow),
            painter.paint(&usage, usage_tone(disk.percent_used)),
            disk.path.clone(),
        ]));
    }
    output.push_str(&table.to_string());
    output
}

fn volume_row(volume: &Volume, painter: &Painter, detailed: bool) -> Row {
    let replicas = format!("{}/{}", volume.replica_count, volume.desired_replicas);
    let replica_tone = if volume.replica_count == 0 {
        Tone::Red
    } else if volume.replica_count < volume.desired_replicas {
        Tone::Yellow
    } else {
        Tone::Green
    };
    let (name_tone, safe_text, safe_tone) = match volume.delete_reason() {
        Some(reason) => (Tone::Highlight, format!("Yes - {}", reason), Tone::Green),
        None => (Tone::Plain, "No".to_string(), Tone::Plain),
    };

    let mut cells = vec![
        painter.paint(&volume.name, name_tone),
        painter.paint(&volume.size.to_string(), Tone::Blue),
        painter.paint(volume.state.as_str(), state_tone(&volume.state)),
        painter.paint(volume.robustness.as_str(), robustness_tone(&volume.robustness)),
    ];
    if detailed {
        cells.push(volume.node.clone());
    }
    cells.extend([
        painter.paint(&replicas, replica_tone),
        painter.paint(&join_or_none(&volume.disk_selector), Tone::Cyan),
        painter.paint(&safe_text, safe_tone),
    ]);
    row(cells)
}

pub(super) fn volumes(report: &StorageReport, painter: &Painter, options: &PresenterOptions) -> String {
    let mut output = section_header(
        "VOLUME INFORMATION",
        "Longhorn volumes with health and deletion safety",
        painter,
        options,
    );
    if report.volumes.is_empty() {
        output.push_str("No volumes found\n");
        return output;
    }

    let mut titles = vec!["VOLUME", "SIZE", "STATE", "ROBUSTNESS"];
    if options.detailed {
        titles.push("NODE");
    }
    titles.extend(["REPLICAS", "DISK SELECTOR", "SAFE TO DELETE"]);

    let mut table = new_table(&titles, painter, options);
    for volume in &report.volumes {
        table.add_row(volume_row(volume, painter, options.detailed));
    }
    output.push_str(&table.to_string());
    output
}

pub(super) fn replicas(report: &StorageReport, painter: &Painter, options: &PresenterOptions) -> String {
    let mut output = section_header(
        "REPLICA INFORMATION",
        "Replica placement per volume",
        painter,
        options,
    );
    if report.replicas.is_empty() {
        output.push_str("No replicas found\n");
        return output;
    }

    let mut table = new_table(
        &["VOLUME", "REPLICA", "NODE", "DISK", "STATE", "MODE", "HEALTHY", "SIZE"],
        painter,
        options,
    );
    for (volume, replicas) in &report.replicas {
        for replica in replicas {
            let healthy = if replica.healthy {
                painter.paint("Yes", Tone::Green)
            } else {
                painter.paint("No", Tone::Red)
            };
            table.add_row(row(vec![
                volume.clone(),
                replica.name.clone(),
                replica.node_id.clone(),
                replica.disk_id.clone(),
                replica.state.clone(),
                replica.mode.clone(),
                healthy,
                painter.paint(&replica.size.to_string(), Tone::Blue),
            ]));
        }
    }
    output.push_str(&table.to_string());
    output
}

pub(super) fn relationships(
    report: &StorageReport,
    painter: &Painter,
    options: &PresenterOptions,
) -> String {
    let mut output = section_header(
        "KUBERNETES RESOURCE RELATIONSHIPS",
        "Longhorn volume → PersistentVolume → claim → pods",
        painter,
        options,
    );
    if report.relationships.is_empty() {
        output.push_str("No Kubernetes resources found using Longhorn volumes\n");
        return output;
    }

    let mut table = new_table(
        &[
            "LONGHORN VOLUME",
            "PV NAME",
            "PVC NAME",
            "PVC NAMESPACE",
            "STORAGE CLASS",
            "SIZE",
            "STATUS",
            "CONSUMER PODS",
        ],
        painter,
        options,
    );
    for (volume, pv) in &report.relationships {
        let consumers = if pv.consumer_pods.is_empty() {
            "none".to_string()
        } else {
            pv.consumer_pods
                .iter()
                .map(|p| format!("{} ({})", p.name, p.phase))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let (claim, namespace) = match &pv.claim {
            Some(c) => (c.name.clone(), c.namespace.clone()),
            None => ("none".to_string(), "none".to_string()),
        };
        let volume_tone = if pv.is_released_or_failed() {
            Tone::Highlight
        } else {
            Tone::Plain
        };
        table.add_row(row(vec![
            painter.paint(volume, volume_tone),
            pv.name.clone(),
            claim,
            namespace,
            pv.storage_class.clone(),
            pv.capacity.clone(),
            painter.paint(&pv.phase, pv_phase_tone(&pv.phase)),
            consumers,
        ]));
    }
    output.push_str(&table.to_string());
    output
}

/// Printed only when something is deletable.
pub(super) fn deletion_candidates(
    report: &StorageReport,
    painter: &Painter,
    options: &PresenterOptions,
) -> String {
    if report.deletion_candidates.is_empty() {
        return String::new();
    }
    let mut output = section_header(
        "VOLUMES SAFE TO DELETE",
        "These volumes can be safely deleted",
        painter,
        options,
    );

    output.push_str("The following volumes are safe to delete:\n");
    for candidate in &report.deletion_candidates {
        output.push_str(&format!(
            "  {} - {}\n",
            painter.paint(&candidate.volume, Tone::Green),
            candidate.reason
        ));
    }
    output.push_str("\nYou can delete them with the following commands:\n");
    for candidate in &report.deletion_candidates {
        output.push_str(&format!("  {}\n", painter.paint(&candidate.command, Tone::Cyan)));
    }
    output
}

pub(super) fn disk_issues(report: &StorageReport, painter: &Painter, options: &PresenterOptions) -> String {
    let mut output = section_header("DISKS WITH ISSUES", "", painter, options);
    if report.disk_issues.is_empty() {
        output.push_str("No disk issues found\n");
        return output;
    }

    let mut table = new_table(&["NODE", "DISK", "ISSUE"], painter, options);
    for issue in &report.disk_issues {
        table.add_row(row(vec![
            issue.node_name.clone(),
            issue.disk_name.clone(),
            painter.paint(&issue.message, Tone::Red),
        ]));
    }
    output.push_str(&table.to_string());
    output
}

fn finding_row(finding: &DiagnosticFinding, painter: &Painter) -> Row {
    row(vec![
        finding.volume.clone(),
        painter.paint(finding.state.as_str(), state_tone(&finding.state)),
        painter.paint(finding.robustness.as_str(), robustness_tone(&finding.robustness)),
        finding.replica_status.clone(),
        finding.rule_code.to_string(),
        painter.paint(&finding.issue, Tone::Red),
        painter.paint(&finding.remediation, Tone::Yellow),
    ])
}

pub(super) fn volume_findings(
    report: &StorageReport,
    painter: &Painter,
    options: &PresenterOptions,
) -> String {
    let mut output = section_header(
        "VOLUMES WITH ISSUES",
        "Diagnosed problems with suggested remediation",
        painter,
        options,
    );
    if report.volume_findings.is_empty() {
        output.push_str("No volume issues found\n");
        return output;
    }

    let mut table = new_table(
        &["VOLUME", "STATE", "ROBUSTNESS", "REPLICAS", "RULE", "ISSUE", "SOLUTION"],
        painter,
        options,
    );
    for finding in &report.volume_findings {
        table.add_row(finding_row(finding, painter));
    }
    output.push_str(&table.to_string());
    output
}

pub(super) fn volumes_by_disk_tag(
    report: &StorageReport,
    painter: &Painter,
    options: &PresenterOptions,
) -> String {
    let mut output = section_header("VOLUMES BY DISK TAG", "", painter, options);
    let tagged = volumes_using_disk_tags(&report.volumes);
    if tagged.is_empty() {
        output.push_str("No volumes using disk tags found\n");
        return output;
    }

    let mut table = new_table(
        &["VOLUME", "DISK SELECTOR", "STATE", "ROBUSTNESS", "REPLICAS", "SIZE"],
        painter,
        options,
    );
    for volume in tagged {
        table.add_row(row(vec![
            volume.name.clone(),
            painter.paint(&volume.disk_selector.join(","), Tone::Cyan),
            painter.paint(volume.state.as_str(), state_tone(&volume.state)),
            painter.paint(volume.robustness.as_str(), robustness_tone(&volume.robustness)),
            volume.replica_status(),
            painter.paint(&volume.size.to_string(), Tone::Blue),
        ]));
    }
    output.push_str(&table.to_string());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_tone_thresholds() {
        assert_eq!(usage_tone(81.0), Tone::Red);
        assert_eq!(usage_tone(80.0), Tone::Yellow);
        assert_eq!(usage_tone(60.5), Tone::Yellow);
        assert_eq!(usage_tone(60.0), Tone::Green);
    }

    #[test]
    fn test_painter_without_color_is_identity() {
        let painter = Painter { color: false };
        assert_eq!(painter.paint("text", Tone::Red), "text");
        assert_eq!(painter.paint("text", Tone::Highlight), "text");
    }

    #[test]
    fn test_compact_drops_descriptions() {
        let painter = Painter { color: false };
        let full = section_header("T", "described", &painter, &PresenterOptions::default());
        let compact = section_header(
            "T",
            "described",
            &painter,
            &PresenterOptions {
                compact: true,
                ..PresenterOptions::default()
            },
        );
        assert!(full.contains("described"));
        assert!(!compact.contains("described"));
    }
}
