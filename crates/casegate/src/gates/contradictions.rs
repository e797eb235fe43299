use async_trait::async_trait;

use super::artifacts::{self, ContradictionList};
use crate::context::{CaseLocation, EvalContext};
use crate::error::GateError;
use crate::gaps::GapType;
use crate::traits::Gate;
use crate::verdict::{Finding, Verdict};

/// No recorded contradiction is left unresolved. A case without a
/// contradictions file has none.
pub struct ContradictionsGate;

#[async_trait]
impl Gate for ContradictionsGate {
    fn name(&self) -> &str {
        "contradictions"
    }

    async fn evaluate(&self, case: &CaseLocation, _ctx: &EvalContext) -> Result<Verdict, GateError> {
        let Some(list) =
            artifacts::read_json_optional::<ContradictionList>(case, artifacts::CONTRADICTIONS)
                .await?
        else {
            return Ok(Verdict::pass().with_detail("contradictions", 0));
        };

        let unresolved: Vec<Finding> = list
            .contradictions
            .iter()
            .filter(|c| !c.resolved)
            .map(|c| {
                let summary = if c.summary.is_empty() { "no summary" } else { c.summary.as_str() };
                Finding::new(
                    GapType::UnresolvedContradiction,
                    &c.id,
                    format!("contradiction {} unresolved: {summary}", c.id),
                )
            })
            .collect();

        let total = list.contradictions.len();
        if unresolved.is_empty() {
            return Ok(Verdict::pass().with_detail("contradictions", total));
        }
        Ok(Verdict::content_failure(format!(
            "{} of {} contradictions unresolved",
            unresolved.len(),
            total
        ))
        .with_findings(unresolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_file_passes() {
        let dir = tempfile::tempdir().unwrap();
        let verdict = ContradictionsGate
            .evaluate(&CaseLocation::new(dir.path()), &EvalContext::default())
            .await
            .unwrap();
        assert!(verdict.passed);
    }

    #[tokio::test]
    async fn unresolved_entries_fail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("contradictions.json"),
            r#"{"contradictions":[
                {"id":"C1","summary":"dates differ","resolved":true},
                {"id":"C2","summary":"amounts differ","resolved":false}
            ]}"#,
        )
        .unwrap();

        let verdict = ContradictionsGate
            .evaluate(&CaseLocation::new(dir.path()), &EvalContext::default())
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.findings.len(), 1);
        assert_eq!(verdict.findings[0].target, "C2");
    }
}
