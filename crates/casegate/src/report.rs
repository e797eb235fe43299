//! Per-gate reports, the aggregate result of a run, and the composed case
//! report handed back to callers.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::CaseLocation;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::gaps::{Gap, GapList};
use crate::registry::GateRegistry;
use crate::verdict::{Details, FailureCategory, Finding, Verdict};

/// Outcome of one gate in one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateReport {
    pub gate: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<Finding>,
    pub duration_ms: u64,
}

impl GateReport {
    /// Build a report from a verdict.
    ///
    /// A failing verdict with no category is treated as a content failure.
    pub fn from_verdict(gate: impl Into<String>, verdict: Verdict, duration_ms: u64) -> Self {
        let category = if verdict.passed {
            None
        } else {
            Some(verdict.category.unwrap_or(FailureCategory::Content))
        };
        Self {
            gate: gate.into(),
            passed: verdict.passed,
            reason: verdict.reason,
            category,
            details: verdict.details,
            findings: verdict.findings,
            duration_ms,
        }
    }

    /// Failing report whose reason is missing or blank.
    pub(crate) fn violates_reason_contract(&self) -> bool {
        !self.passed
            && self
                .reason
                .as_deref()
                .map_or(true, |r| r.trim().is_empty())
    }
}

/// Everything one run produced. Immutable after construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregateResult {
    pub case_dir: CaseLocation,
    pub overall_passed: bool,
    pub evaluated_at: DateTime<Utc>,
    pub gates: BTreeMap<String, GateReport>,
}

impl AggregateResult {
    pub fn new(case_dir: CaseLocation, gates: BTreeMap<String, GateReport>) -> Self {
        let overall_passed = gates.values().all(|r| r.passed);
        Self {
            case_dir,
            overall_passed,
            evaluated_at: Utc::now(),
            gates,
        }
    }

    pub fn failing(&self) -> impl Iterator<Item = &GateReport> {
        self.gates.values().filter(|r| !r.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.gates.values().filter(|r| r.passed).count()
    }

    /// Check the gate keys against the registry: no omissions, no extras.
    pub fn ensure_complete(&self, registry: &GateRegistry) -> OrchestratorResult<()> {
        if let Some(missing) = registry.names().find(|n| !self.gates.contains_key(*n)) {
            return Err(OrchestratorError::Contract(format!(
                "no report for registered gate '{missing}'"
            )));
        }
        if let Some(extra) = self.gates.keys().find(|k| !registry.contains(k)) {
            return Err(OrchestratorError::Contract(format!(
                "report for unregistered gate '{extra}'"
            )));
        }
        if let Some((key, report)) = self.gates.iter().find(|(k, r)| **k != r.gate) {
            return Err(OrchestratorError::Contract(format!(
                "report filed under '{key}' names gate '{}'",
                report.gate
            )));
        }
        Ok(())
    }
}

/// The single object returned to callers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseReport {
    pub case_dir: CaseLocation,
    pub overall_passed: bool,
    pub evaluated_at: DateTime<Utc>,
    pub gates: BTreeMap<String, GateReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocking: Option<Vec<Gap>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Vec<Gap>>,
}

impl CaseReport {
    /// Human-readable summary: gates by name, then the gap backlog.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let verdict = if self.overall_passed { "PASSED" } else { "FAILED" };
        let passed = self.gates.values().filter(|r| r.passed).count();
        let _ = writeln!(
            out,
            "Case {}: {} ({}/{} gates passed)",
            self.case_dir,
            verdict,
            passed,
            self.gates.len()
        );

        for report in self.gates.values() {
            if report.passed {
                let _ = writeln!(out, "  PASS {}", report.gate);
            } else {
                let reason = report.reason.as_deref().unwrap_or("no reason given");
                let _ = writeln!(out, "  FAIL {}: {}", report.gate, reason);
            }
        }

        if let Some(blocking) = self.blocking.as_deref().filter(|g| !g.is_empty()) {
            let _ = writeln!(out, "Blocking gaps:");
            for gap in blocking {
                let _ = writeln!(out, "  {} [{}] {}", gap.gap_id, gap.gap_type, gap.description);
            }
        }
        if let Some(advisory) = self.advisory.as_deref().filter(|g| !g.is_empty()) {
            let _ = writeln!(out, "Advisory gaps:");
            for gap in advisory {
                let _ = writeln!(out, "  {} [{}] {}", gap.gap_id, gap.gap_type, gap.description);
            }
        }
        out
    }
}

/// Folds a run and its gaps into a [`CaseReport`]. Shape only, no new
/// computation.
pub struct ReportAggregator;

impl ReportAggregator {
    /// Compose the caller-facing report.
    ///
    /// Gaps are attached only when the run failed. A gate set that does not
    /// match the registry is a contract violation.
    pub fn compose(
        result: AggregateResult,
        gaps: Option<GapList>,
        registry: &GateRegistry,
    ) -> OrchestratorResult<CaseReport> {
        result.ensure_complete(registry)?;

        let (blocking, advisory) = match (result.overall_passed, gaps) {
            (false, Some(list)) => {
                let advisory = (!list.advisory.is_empty()).then_some(list.advisory);
                (Some(list.blocking), advisory)
            }
            (false, None) => {
                return Err(OrchestratorError::Contract(
                    "failed run composed without a gap list".into(),
                ))
            }
            (true, _) => (None, None),
        };

        Ok(CaseReport {
            case_dir: result.case_dir,
            overall_passed: result.overall_passed,
            evaluated_at: result.evaluated_at,
            gates: result.gates,
            blocking,
            advisory,
        })
    }
}
