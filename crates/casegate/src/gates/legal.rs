use async_trait::async_trait;

use super::artifacts::{self, LegalReview};
use crate::context::{CaseLocation, EvalContext};
use crate::error::GateError;
use crate::gaps::GapType;
use crate::traits::Gate;
use crate::verdict::{Finding, Verdict};

/// Legal review has happened and left nothing open.
pub struct LegalGate;

#[async_trait]
impl Gate for LegalGate {
    fn name(&self) -> &str {
        "legal"
    }

    async fn evaluate(&self, case: &CaseLocation, _ctx: &EvalContext) -> Result<Verdict, GateError> {
        let review: LegalReview = artifacts::read_json(case, artifacts::LEGAL).await?;

        let open: Vec<Finding> = review
            .issues
            .iter()
            .filter(|i| !i.resolved)
            .map(|i| {
                Finding::new(
                    GapType::LegalIssue,
                    &i.id,
                    format!("legal issue {} open: {}", i.id, i.summary),
                )
            })
            .collect();

        match (review.reviewed, open.is_empty()) {
            (true, true) => Ok(Verdict::pass().with_detail("issues", review.issues.len())),
            (false, _) => Ok(Verdict::content_failure("legal review not completed").with_findings(open)),
            (true, false) => Ok(Verdict::content_failure(format!(
                "{} legal issues unresolved",
                open.len()
            ))
            .with_findings(open)),
        }
    }
}
