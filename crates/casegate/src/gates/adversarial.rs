use async_trait::async_trait;

use super::artifacts;
use crate::context::{CaseLocation, EvalContext};
use crate::error::GateError;
use crate::traits::Gate;
use crate::verdict::Verdict;

/// The adversarial review exists and is substantive.
pub struct AdversarialGate;

#[async_trait]
impl Gate for AdversarialGate {
    fn name(&self) -> &str {
        "adversarial"
    }

    async fn evaluate(&self, case: &CaseLocation, ctx: &EvalContext) -> Result<Verdict, GateError> {
        let review = artifacts::read_text(case, artifacts::ADVERSARIAL_REVIEW).await?;
        let words = artifacts::word_count(&review);
        let required = ctx.thresholds.min_adversarial_words;
        if words < required {
            return Ok(Verdict::content_failure(format!(
                "adversarial review has {words} words, {required} required"
            ))
            .with_detail("words", words));
        }
        Ok(Verdict::pass().with_detail("words", words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use crate::context::Credentials;

    #[tokio::test]
    async fn short_review_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("review")).unwrap();
        std::fs::write(dir.path().join("review/adversarial.md"), "Looks fine.").unwrap();

        let verdict = AdversarialGate
            .evaluate(&CaseLocation::new(dir.path()), &EvalContext::default())
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert_eq!(
            verdict.reason.as_deref(),
            Some("adversarial review has 2 words, 20 required")
        );
    }

    #[tokio::test]
    async fn threshold_comes_from_context() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("review")).unwrap();
        std::fs::write(dir.path().join("review/adversarial.md"), "Looks fine.").unwrap();

        let thresholds = Thresholds {
            min_adversarial_words: 2,
            ..Thresholds::default()
        };
        let ctx = EvalContext::new(Credentials::default(), thresholds);
        let verdict = AdversarialGate
            .evaluate(&CaseLocation::new(dir.path()), &ctx)
            .await
            .unwrap();
        assert!(verdict.passed);
    }

    #[tokio::test]
    async fn missing_review_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AdversarialGate
            .evaluate(&CaseLocation::new(dir.path()), &EvalContext::default())
            .await
            .unwrap_err();
        match err {
            GateError::MissingArtifact(path) => assert!(path.ends_with("review/adversarial.md")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
