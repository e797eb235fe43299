use std::future::Future;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::{CaseGateConfig, RunnerConfig};
use crate::context::{CaseLocation, Credentials, EvalContext};
use crate::error::OrchestratorResult;
use crate::gaps::{GapList, GapSynthesizer};
use crate::registry::GateRegistry;
use crate::report::{AggregateResult, CaseReport, ReportAggregator};
use crate::runner::GateRunner;

/// Caller-facing entry point: run, synthesise gaps, compose.
///
/// Holds no per-case state; one instance can verify many cases, including
/// concurrently.
pub struct CaseVerifier {
    runner: GateRunner,
    ctx: Arc<EvalContext>,
}

impl CaseVerifier {
    pub fn new(registry: Arc<GateRegistry>, config: RunnerConfig, ctx: Arc<EvalContext>) -> Self {
        Self {
            runner: GateRunner::new(registry, config),
            ctx,
        }
    }

    /// Standard registry, configured from `config`, with the given credentials.
    pub fn from_config(config: &CaseGateConfig, credentials: Credentials) -> OrchestratorResult<Self> {
        let registry = GateRegistry::standard(config)?;
        let ctx = EvalContext::new(credentials, config.thresholds.clone());
        Ok(Self::new(
            Arc::new(registry),
            config.runner.clone(),
            Arc::new(ctx),
        ))
    }

    pub fn registry(&self) -> &Arc<GateRegistry> {
        self.runner.registry()
    }

    pub fn runner_config(&self) -> &RunnerConfig {
        self.runner.config()
    }

    pub async fn run(&self, case: &CaseLocation) -> OrchestratorResult<AggregateResult> {
        self.runner.run(case, Arc::clone(&self.ctx)).await
    }

    pub async fn run_until<C>(&self, case: &CaseLocation, cancel: C) -> OrchestratorResult<AggregateResult>
    where
        C: Future<Output = ()>,
    {
        self.runner.run_until(case, Arc::clone(&self.ctx), cancel).await
    }

    /// Run the case and return its gap backlog. A passing case has none.
    pub async fn generate_gaps(&self, case: &CaseLocation) -> OrchestratorResult<GapList> {
        let result = self.run(case).await?;
        Ok(Self::gaps_for(&result))
    }

    /// Like [`generate_gaps`](Self::generate_gaps), abandoned if `cancel`
    /// resolves first.
    pub async fn generate_gaps_until<C>(&self, case: &CaseLocation, cancel: C) -> OrchestratorResult<GapList>
    where
        C: Future<Output = ()>,
    {
        let result = self.run_until(case, cancel).await?;
        Ok(Self::gaps_for(&result))
    }

    /// Run, synthesise gaps and compose the full report.
    pub async fn verify(&self, case: &CaseLocation) -> OrchestratorResult<CaseReport> {
        self.verify_until(case, std::future::pending::<()>()).await
    }

    #[instrument(skip(self, cancel), fields(case = %case))]
    pub async fn verify_until<C>(&self, case: &CaseLocation, cancel: C) -> OrchestratorResult<CaseReport>
    where
        C: Future<Output = ()>,
    {
        let result = self.run_until(case, cancel).await?;
        let gaps = Self::gaps_for(&result);
        info!(
            passed = result.overall_passed,
            blocking = gaps.blocking.len(),
            advisory = gaps.advisory.len(),
            "Case verified"
        );
        ReportAggregator::compose(result, Some(gaps), self.registry())
    }

    fn gaps_for(result: &AggregateResult) -> GapList {
        if result.overall_passed {
            GapList::default()
        } else {
            GapSynthesizer::synthesize(result)
        }
    }
}
