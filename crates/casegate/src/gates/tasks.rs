use async_trait::async_trait;

use super::artifacts::{self, TaskList};
use crate::context::{CaseLocation, EvalContext};
use crate::error::GateError;
use crate::gaps::GapType;
use crate::traits::Gate;
use crate::verdict::{Finding, Verdict};

/// Every task is closed.
pub struct TasksGate;

#[async_trait]
impl Gate for TasksGate {
    fn name(&self) -> &str {
        "tasks"
    }

    async fn evaluate(&self, case: &CaseLocation, _ctx: &EvalContext) -> Result<Verdict, GateError> {
        let list: TaskList = artifacts::read_json(case, artifacts::TASKS).await?;
        if list.tasks.is_empty() {
            return Ok(Verdict::content_failure("no tasks defined"));
        }

        let open: Vec<Finding> = list
            .tasks
            .iter()
            .filter(|t| !t.is_done())
            .map(|t| {
                let status = if t.status.trim().is_empty() {
                    "no status"
                } else {
                    t.status.trim()
                };
                let title = if t.title.is_empty() { &t.id } else { &t.title };
                Finding::new(
                    GapType::OpenTask,
                    &t.id,
                    format!("task {} ({title}) is {status}", t.id),
                )
            })
            .collect();

        let total = list.tasks.len();
        if open.is_empty() {
            return Ok(Verdict::pass().with_detail("tasks", total));
        }
        Ok(
            Verdict::content_failure(format!("{} of {} tasks still open", open.len(), total))
                .with_detail("open", open.len())
                .with_findings(open),
        )
    }
}
