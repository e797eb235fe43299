use async_trait::async_trait;

use crate::context::{CaseLocation, EvalContext};
use crate::error::GateError;
use crate::verdict::Verdict;

/// One named, independent verification check over a case.
///
/// Gates only read case artifacts and keep no state between invocations.
/// Content and infrastructure failures are returned as failing [`Verdict`]s;
/// `Err` is reserved for execution problems (I/O, malformed input), which the
/// runner recovers into a failing report.
#[async_trait]
pub trait Gate: Send + Sync {
    /// Name the gate is registered and reported under.
    fn name(&self) -> &str;

    /// Evaluate the case.
    async fn evaluate(&self, case: &CaseLocation, ctx: &EvalContext) -> Result<Verdict, GateError>;
}
