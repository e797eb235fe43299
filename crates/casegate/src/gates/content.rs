use async_trait::async_trait;

use super::artifacts;
use crate::context::{CaseLocation, EvalContext};
use crate::error::GateError;
use crate::gaps::GapType;
use crate::traits::Gate;
use crate::verdict::{Finding, Verdict};

/// The outline document carries every required section.
pub struct ContentGate;

#[async_trait]
impl Gate for ContentGate {
    fn name(&self) -> &str {
        "content"
    }

    async fn evaluate(&self, case: &CaseLocation, ctx: &EvalContext) -> Result<Verdict, GateError> {
        let report = artifacts::read_text(case, artifacts::REPORT).await?;
        let present: Vec<String> = artifacts::headings(&report)
            .into_iter()
            .map(|h| h.to_lowercase())
            .collect();

        let missing: Vec<Finding> = ctx
            .thresholds
            .required_sections
            .iter()
            .filter(|section| !present.contains(&section.trim().to_lowercase()))
            .map(|section| {
                Finding::new(
                    GapType::MissingSection,
                    section,
                    format!("{} has no '{section}' section", artifacts::REPORT),
                )
            })
            .collect();

        if missing.is_empty() {
            return Ok(Verdict::pass().with_detail("sections", present.len()));
        }
        let names: Vec<&str> = missing.iter().map(|f| f.target.as_str()).collect();
        Ok(Verdict::content_failure(format!(
            "report is missing sections: {}",
            names.join(", ")
        ))
        .with_findings(missing))
    }
}
