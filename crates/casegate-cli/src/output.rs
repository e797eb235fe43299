//! Output formatting utilities

use std::time::Duration;

use casegate::{CaseReport, Gap, GapList};
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Table row for gate listing
#[derive(Debug, Serialize, Tabled)]
pub struct GateRow {
    /// Registered gate name
    #[tabled(rename = "GATE")]
    pub name: String,
    /// Effective timeout in milliseconds
    #[tabled(rename = "TIMEOUT_MS")]
    pub timeout_ms: u64,
}

impl GateRow {
    pub fn new(name: &str, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

fn colorize_summary_line(line: &str) -> String {
    if let Some(rest) = line.strip_prefix("  PASS ") {
        format!("  {} {rest}", "PASS".green())
    } else if let Some(rest) = line.strip_prefix("  FAIL ") {
        format!("  {} {rest}", "FAIL".red())
    } else if line.ends_with("gaps:") || line.starts_with("Case ") {
        line.bold().to_string()
    } else {
        line.to_string()
    }
}

pub fn render_report(report: &CaseReport, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => Ok(report
            .summary()
            .lines()
            .map(colorize_summary_line)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn gap_line(gap: &Gap) -> String {
    let mut line = format!("  {} [{}] {}", gap.gap_id, gap.gap_type, gap.description);
    if gap.reported_by.len() > 1 {
        line.push_str(&format!(" (reported by {})", gap.reported_by.join(", ")));
    }
    line
}

pub fn render_gaps(gaps: &GapList, format: OutputFormat) -> CliResult<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(gaps)?);
    }
    if gaps.is_empty() {
        return Ok("No gaps".dimmed().to_string());
    }

    let mut lines = Vec::new();
    if !gaps.blocking.is_empty() {
        lines.push(format!("Blocking gaps ({}):", gaps.blocking.len()).red().bold().to_string());
        lines.extend(gaps.blocking.iter().map(gap_line));
    }
    if !gaps.advisory.is_empty() {
        lines.push(format!("Advisory gaps ({}):", gaps.advisory.len()).yellow().bold().to_string());
        lines.extend(gaps.advisory.iter().map(gap_line));
    }
    Ok(lines.join("\n"))
}

pub fn render_gates(rows: &[GateRow], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Text if rows.is_empty() => Ok("No gates registered".dimmed().to_string()),
        OutputFormat::Text => Ok(Table::new(rows).to_string()),
    }
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use casegate::{FailureSignal, GapSynthesizer, GapType};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn gap_text_lists_blocking_then_advisory() {
        plain();
        let gaps = GapSynthesizer::from_signals([
            FailureSignal::new(GapType::GateFailed, "legal", "gate 'legal' failed: not reviewed"),
            FailureSignal::new(GapType::OpenTask, "tasks", "task T2 is open").with_target("T2"),
        ]);

        let text = render_gaps(&gaps, OutputFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Blocking gaps (1):");
        assert!(lines[1].contains("[GATE_FAILED] gate 'legal' failed"));
        assert_eq!(lines[2], "Advisory gaps (1):");
        assert!(lines[3].contains("[OPEN_TASK] task T2 is open"));
    }

    #[test]
    fn empty_gaps_render_plainly() {
        plain();
        assert_eq!(render_gaps(&GapList::default(), OutputFormat::Text).unwrap(), "No gaps");
        let json = render_gaps(&GapList::default(), OutputFormat::Json).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&json).unwrap(), serde_json::json!({"blocking": []}));
    }

    #[test]
    fn gate_table_lists_rows_in_order() {
        plain();
        let rows = vec![
            GateRow::new("tasks", Duration::from_secs(60)),
            GateRow::new("contradictions", Duration::from_millis(1500)),
        ];
        let text = render_gates(&rows, OutputFormat::Text).unwrap();
        let header = text.find("GATE").unwrap();
        let tasks = text.find("tasks").unwrap();
        let contradictions = text.find("contradictions").unwrap();
        assert!(text.contains("TIMEOUT_MS"));
        assert!(header < tasks && tasks < contradictions);
        assert!(text.contains("60000"));
        assert!(text.contains("1500"));
    }

    #[test]
    fn gate_rows_serialise_with_field_names() {
        let rows = vec![GateRow::new("legal", Duration::from_secs(5))];
        let json = render_gates(&rows, OutputFormat::Json).unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&json).unwrap(),
            serde_json::json!([{"name": "legal", "timeout_ms": 5000}])
        );
    }
}
