//! Gate runner.
//!
//! Evaluates every registered gate concurrently, one tokio task per gate.
//! Deadlines are enforced from outside the gate's task, so a gate that blocks
//! its thread still times out. A gate's error, panic or timeout becomes a
//! failing report for that gate only; the other gates are unaffected.

use std::any::Any;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, instrument, warn};

use crate::config::RunnerConfig;
use crate::context::{CaseLocation, EvalContext};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::registry::GateRegistry;
use crate::report::{AggregateResult, GateReport};
use crate::traits::Gate;
use crate::verdict::Verdict;

/// Runs every gate in a registry against one case.
pub struct GateRunner {
    registry: Arc<GateRegistry>,
    config: RunnerConfig,
}

impl GateRunner {
    pub fn new(registry: Arc<GateRegistry>, config: RunnerConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<GateRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Evaluate every registered gate. Always yields one report per gate.
    pub async fn run(
        &self,
        case: &CaseLocation,
        ctx: Arc<EvalContext>,
    ) -> OrchestratorResult<AggregateResult> {
        self.run_until(case, ctx, std::future::pending::<()>()).await
    }

    /// Evaluate every registered gate unless `cancel` resolves first.
    ///
    /// On cancellation all gate tasks are aborted and no partial result is
    /// returned.
    #[instrument(skip(self, ctx, cancel), fields(case = %case, gates = self.registry.len()))]
    pub async fn run_until<C>(
        &self,
        case: &CaseLocation,
        ctx: Arc<EvalContext>,
        cancel: C,
    ) -> OrchestratorResult<AggregateResult>
    where
        C: Future<Output = ()>,
    {
        info!("Evaluating case");

        let mut aborts = Vec::with_capacity(self.registry.len());
        let mut pending = FuturesUnordered::new();
        for registered in self.registry.iter() {
            let name = registered.name().to_string();
            let timeout = self.config.timeout_for(&name);
            debug!(gate = %name, timeout_ms = millis(timeout), "Evaluating gate");

            let handle = tokio::spawn(evaluate_gate(
                Arc::clone(registered.gate()),
                case.clone(),
                Arc::clone(&ctx),
            ));
            aborts.push(handle.abort_handle());
            pending.push(supervise(name, handle, timeout));
        }

        let collected = tokio::select! {
            biased;
            _ = cancel => None,
            reports = collect(&mut pending) => Some(reports),
        };
        drop(pending);

        let gates = match collected {
            Some(reports) => {
                abort_all(&aborts);
                reports?
            }
            None => {
                abort_all(&aborts);
                warn!("Evaluation cancelled; discarding partial results");
                return Err(OrchestratorError::Cancelled);
            }
        };

        let result = AggregateResult::new(case.clone(), gates);
        result.ensure_complete(&self.registry)?;

        info!(
            passed = result.passed_count(),
            failed = result.gates.len() - result.passed_count(),
            overall_passed = result.overall_passed,
            "Case evaluated"
        );

        Ok(result)
    }
}

fn abort_all(handles: &[AbortHandle]) {
    for handle in handles {
        handle.abort();
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

async fn collect<S>(pending: &mut S) -> OrchestratorResult<BTreeMap<String, GateReport>>
where
    S: futures::Stream<Item = GateReport> + Unpin,
{
    let mut reports = BTreeMap::new();
    while let Some(report) = pending.next().await {
        if report.violates_reason_contract() {
            return Err(OrchestratorError::Contract(format!(
                "gate '{}' failed without a reason",
                report.gate
            )));
        }
        if reports.contains_key(&report.gate) {
            return Err(OrchestratorError::Contract(format!(
                "gate '{}' reported twice",
                report.gate
            )));
        }
        reports.insert(report.gate.clone(), report);
    }
    Ok(reports)
}

/// Body of a gate task. Errors are recovered here; panics and timeouts are
/// observed by [`supervise`].
async fn evaluate_gate(gate: Arc<dyn Gate>, case: CaseLocation, ctx: Arc<EvalContext>) -> Verdict {
    match gate.evaluate(&case, &ctx).await {
        Ok(verdict) => verdict,
        Err(error) => Verdict::execution_error(error),
    }
}

/// Wait for one gate task up to its deadline and turn the outcome into a
/// report. The deadline runs on the collector, not inside the gate's task.
async fn supervise(name: String, mut handle: JoinHandle<Verdict>, timeout: Duration) -> GateReport {
    let started = Instant::now();

    let verdict = match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(verdict)) => verdict,
        Ok(Err(join_error)) if join_error.is_panic() => {
            let message = panic_message(join_error.into_panic().as_ref());
            warn!(gate = %name, panic = %message, "Gate panicked");
            Verdict::panicked(message)
        }
        Ok(Err(join_error)) => Verdict::execution_error(format!("gate task ended early: {join_error}")),
        Err(_elapsed) => {
            handle.abort();
            warn!(gate = %name, timeout_ms = millis(timeout), "Gate timed out");
            Verdict::timed_out(millis(timeout))
        }
    };

    let duration_ms = millis(started.elapsed());
    match (verdict.passed, verdict.category) {
        (true, _) => debug!(gate = %name, duration_ms, "Gate passed"),
        (false, Some(category)) if category.is_infrastructure() => warn!(
            gate = %name,
            category = %category,
            reason = verdict.reason.as_deref().unwrap_or_default(),
            "Gate could not evaluate case"
        ),
        (false, _) => debug!(
            gate = %name,
            reason = verdict.reason.as_deref().unwrap_or_default(),
            "Gate failed"
        ),
    }

    GateReport::from_verdict(name, verdict, duration_ms)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
