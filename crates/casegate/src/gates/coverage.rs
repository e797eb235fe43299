use async_trait::async_trait;

use super::artifacts::{self, TaskList};
use crate::context::{CaseLocation, EvalContext};
use crate::error::GateError;
use crate::gaps::GapType;
use crate::traits::Gate;
use crate::verdict::{Finding, Verdict};

/// Every task has a non-empty findings note at `findings/<task>.md`.
pub struct CoverageGate;

#[async_trait]
impl Gate for CoverageGate {
    fn name(&self) -> &str {
        "coverage"
    }

    async fn evaluate(&self, case: &CaseLocation, _ctx: &EvalContext) -> Result<Verdict, GateError> {
        let list: TaskList = artifacts::read_json(case, artifacts::TASKS).await?;
        if list.tasks.is_empty() {
            return Ok(Verdict::content_failure("no tasks defined"));
        }

        let mut findings = Vec::new();
        for task in &list.tasks {
            if !artifacts::is_plain_file_stem(&task.id) {
                return Err(GateError::MalformedArtifact {
                    path: case.artifact(artifacts::TASKS),
                    reason: format!("task id '{}' is not a valid file name", task.id),
                });
            }
            let note = format!("{}/{}.md", artifacts::FINDINGS_DIR, task.id);
            let covered = artifacts::read_text_optional(case, &note)
                .await?
                .is_some_and(|text| !text.trim().is_empty());
            if !covered {
                findings.push(Finding::new(
                    GapType::MissingFinding,
                    &task.id,
                    format!("task {} has no findings note at {note}", task.id),
                ));
            }
        }

        let total = list.tasks.len();
        if findings.is_empty() {
            return Ok(Verdict::pass().with_detail("tasks", total));
        }
        Ok(Verdict::content_failure(format!(
            "{} of {} tasks have no findings",
            findings.len(),
            total
        ))
        .with_detail("tasks", total)
        .with_findings(findings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::write_minimal_case;

    #[tokio::test]
    async fn passes_when_every_task_has_a_note() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_case(dir.path()).unwrap();

        let verdict = CoverageGate
            .evaluate(&CaseLocation::new(dir.path()), &EvalContext::default())
            .await
            .unwrap();
        assert!(verdict.passed);
    }

    #[tokio::test]
    async fn flags_empty_and_missing_notes() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_case(dir.path()).unwrap();
        std::fs::write(dir.path().join("findings/T1.md"), "  \n").unwrap();
        std::fs::remove_file(dir.path().join("findings/T2.md")).unwrap();

        let verdict = CoverageGate
            .evaluate(&CaseLocation::new(dir.path()), &EvalContext::default())
            .await
            .unwrap();
        assert!(!verdict.passed);
        assert_eq!(verdict.reason.as_deref(), Some("2 of 2 tasks have no findings"));
        let targets: Vec<_> = verdict.findings.iter().map(|f| f.target.as_str()).collect();
        assert_eq!(targets, vec!["T1", "T2"]);
    }

    #[tokio::test]
    async fn task_id_escaping_findings_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_case(dir.path()).unwrap();
        std::fs::write(dir.path().join("outside.md"), "note outside the findings dir").unwrap();
        std::fs::write(
            dir.path().join("tasks.json"),
            r#"{"tasks":[{"id":"../outside","title":"Escape","status":"done"}]}"#,
        )
        .unwrap();

        let err = CoverageGate
            .evaluate(&CaseLocation::new(dir.path()), &EvalContext::default())
            .await
            .unwrap_err();
        match err {
            GateError::MalformedArtifact { path, reason } => {
                assert!(path.ends_with("tasks.json"));
                assert!(reason.contains("../outside"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_task_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CoverageGate
            .evaluate(&CaseLocation::new(dir.path()), &EvalContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::MissingArtifact(_)));
    }
}
