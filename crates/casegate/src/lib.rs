//! Case Gate: quality-gate orchestration for research cases.
//!
//! A case is a directory of research artifacts. A fixed registry of
//! independent gates evaluates it concurrently; the results are folded into
//! one pass/fail answer, and every failure is turned into a stable,
//! deduplicated backlog of gaps.
//!
//! ## Guarantees
//!
//! - **Completeness**: every registered gate appears exactly once in the
//!   result, whatever it did (passed, failed, errored, panicked, timed out).
//! - **Isolation**: one gate's failure never prevents another's evaluation.
//! - **Determinism**: results are keyed and ordered by gate name; gap ids are
//!   content-addressed, so the same failure yields the same id on every run.
//! - **Fail-closed**: a failure with no reason, or a result set that does not
//!   match the registry, is a fatal contract error rather than a silent pass.
//!
//! ## Flow
//!
//! 1. [`GateRunner`] runs every gate in a [`GateRegistry`] → [`AggregateResult`]
//! 2. [`GapSynthesizer`] derives a [`GapList`] from the failures
//! 3. [`ReportAggregator`] composes the caller-facing [`CaseReport`]
//!
//! [`CaseVerifier`] wires the three together.

pub mod config;
pub mod context;
pub mod error;
pub mod gaps;
pub mod gates;
pub mod mocks;
pub mod registry;
pub mod report;
pub mod runner;
pub mod traits;
pub mod verdict;
pub mod verifier;

pub use config::{CaseGateConfig, RunnerConfig, Thresholds, VerifierConfig};
pub use context::{CaseLocation, CredentialClass, Credentials, EvalContext, Secret};
pub use error::{ConfigError, GateError, OrchestratorError, OrchestratorResult, RegistryError};
pub use gaps::{FailureSignal, Gap, GapId, GapList, GapSynthesizer, GapType};
pub use gates::{ClaimJudgement, ClaimVerifier, HttpClaimVerifier, VerifierError};
pub use registry::{GateRegistry, GateRegistryBuilder, RegisteredGate, STANDARD_GATES};
pub use report::{AggregateResult, CaseReport, GateReport, ReportAggregator};
pub use runner::GateRunner;
pub use traits::Gate;
pub use verdict::{FailureCategory, Finding, Verdict};
pub use verifier::CaseVerifier;
