use std::collections::HashSet;

use async_trait::async_trait;

use super::artifacts::{self, SourceList};
use crate::context::{CaseLocation, EvalContext};
use crate::error::GateError;
use crate::gaps::GapType;
use crate::traits::Gate;
use crate::verdict::{Finding, Verdict};

/// Every source has a URL and a capture; ids are unique.
pub struct SourcesGate;

#[async_trait]
impl Gate for SourcesGate {
    fn name(&self) -> &str {
        "sources"
    }

    async fn evaluate(&self, case: &CaseLocation, _ctx: &EvalContext) -> Result<Verdict, GateError> {
        let list: SourceList = artifacts::read_json(case, artifacts::SOURCES).await?;
        if list.sources.is_empty() {
            return Ok(Verdict::content_failure("no sources recorded"));
        }

        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = list
            .sources
            .iter()
            .filter(|s| !seen.insert(s.id.as_str()))
            .map(|s| s.id.as_str())
            .collect();
        if !duplicates.is_empty() {
            return Err(GateError::MalformedArtifact {
                path: case.artifact(artifacts::SOURCES),
                reason: format!("duplicate source ids: {}", duplicates.join(", ")),
            });
        }

        let uncaptured: Vec<Finding> = list
            .sources
            .iter()
            .filter_map(|s| {
                let problem = match (s.url.trim().is_empty(), s.captured) {
                    (true, _) => "has no URL",
                    (false, false) => "was not captured",
                    (false, true) => return None,
                };
                Some(Finding::new(
                    GapType::UncapturedSource,
                    &s.id,
                    format!("source {} {problem}", s.id),
                ))
            })
            .collect();

        let total = list.sources.len();
        if uncaptured.is_empty() {
            return Ok(Verdict::pass().with_detail("sources", total));
        }
        Ok(Verdict::content_failure(format!(
            "{} of {} sources not captured",
            uncaptured.len(),
            total
        ))
        .with_detail("sources", total)
        .with_findings(uncaptured))
    }
}
