use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;

use super::artifacts::{self, SourceList};
use crate::context::{CaseLocation, EvalContext};
use crate::error::GateError;
use crate::gaps::GapType;
use crate::traits::Gate;
use crate::verdict::{Finding, Verdict};

/// The report cites densely enough, and only cites sources that exist.
pub struct RigorGate;

/// Source ids cited as `[@S1]` or `[@S1; @S2]`, in order of appearance.
fn citations(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("[@") {
        let body = &rest[start + 1..];
        let Some(end) = body.find(']') else {
            break;
        };
        out.extend(
            body[..end]
                .split([';', ','])
                .map(|part| part.trim().trim_start_matches('@').trim())
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        );
        rest = &body[end + 1..];
    }
    out
}

#[async_trait]
impl Gate for RigorGate {
    fn name(&self) -> &str {
        "rigor"
    }

    async fn evaluate(&self, case: &CaseLocation, ctx: &EvalContext) -> Result<Verdict, GateError> {
        let report = artifacts::read_text(case, artifacts::REPORT).await?;
        let sources: SourceList = artifacts::read_json(case, artifacts::SOURCES).await?;
        let known: HashSet<&str> = sources.sources.iter().map(|s| s.id.as_str()).collect();

        let cited = citations(&report);
        let words = artifacts::word_count(&report);
        let density = if words == 0 {
            0.0
        } else {
            cited.len() as f64 * 100.0 / words as f64
        };

        let dangling: BTreeSet<&str> = cited
            .iter()
            .map(String::as_str)
            .filter(|id| !known.contains(id))
            .collect();
        let findings: Vec<Finding> = dangling
            .iter()
            .map(|id| {
                Finding::new(
                    GapType::DanglingCitation,
                    *id,
                    format!("report cites {id}, which is not a recorded source"),
                )
            })
            .collect();

        let required = ctx.thresholds.min_citations_per_100_words;
        let rounded = (density * 100.0).round() / 100.0;
        let verdict = if density < required {
            Verdict::content_failure(format!(
                "citation density {rounded:.2} per 100 words, {required:.2} required"
            ))
        } else if !findings.is_empty() {
            Verdict::content_failure(format!("{} dangling citations", findings.len()))
        } else {
            Verdict::pass()
        };
        Ok(verdict
            .with_detail("citations", cited.len())
            .with_detail("words", words)
            .with_detail("density", rounded)
            .with_findings(findings))
    }
}
