//! Built-in gates.
//!
//! Each gate is an independent check over the case artifacts. The runner
//! treats them as opaque; they are kept deliberately small.

pub mod artifacts;
mod adversarial;
mod claims;
mod content;
mod contradictions;
mod coverage;
mod legal;
mod rigor;
mod sources;
mod tasks;

pub use adversarial::AdversarialGate;
pub use claims::{ClaimJudgement, ClaimVerifier, ClaimsGate, HttpClaimVerifier, VerifierError};
pub use content::ContentGate;
pub use contradictions::ContradictionsGate;
pub use coverage::CoverageGate;
pub use legal::LegalGate;
pub use rigor::RigorGate;
pub use sources::SourcesGate;
pub use tasks::TasksGate;
