use std::io;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::context::{CaseLocation, EvalContext, Secret};
use crate::error::GateError;
use crate::gates::artifacts::Claim;
use crate::gates::{ClaimJudgement, ClaimVerifier, VerifierError};
use crate::traits::Gate;
use crate::verdict::Verdict;

/// Mock gate returning a fixed verdict.
pub struct StaticGate {
    name: String,
    verdict: Verdict,
}

impl StaticGate {
    pub fn new(name: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            name: name.into(),
            verdict,
        }
    }

    pub fn passing(name: impl Into<String>) -> Self {
        Self::new(name, Verdict::pass())
    }

    pub fn failing(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(name, Verdict::content_failure(reason))
    }
}

#[async_trait]
impl Gate for StaticGate {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, _case: &CaseLocation, _ctx: &EvalContext) -> Result<Verdict, GateError> {
        Ok(self.verdict.clone())
    }
}

/// Mock gate that always returns an error.
pub struct FailingGate {
    name: String,
    message: String,
}

impl FailingGate {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Gate for FailingGate {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, _case: &CaseLocation, _ctx: &EvalContext) -> Result<Verdict, GateError> {
        Err(GateError::Other(self.message.clone()))
    }
}

/// Mock gate that panics.
pub struct PanickingGate {
    name: String,
}

impl PanickingGate {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Gate for PanickingGate {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, _case: &CaseLocation, _ctx: &EvalContext) -> Result<Verdict, GateError> {
        panic!("{} lost its mind", self.name)
    }
}

/// Mock gate that sleeps before passing.
pub struct SlowGate {
    name: String,
    delay: Duration,
}

impl SlowGate {
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
        }
    }
}

#[async_trait]
impl Gate for SlowGate {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, _case: &CaseLocation, _ctx: &EvalContext) -> Result<Verdict, GateError> {
        tokio::time::sleep(self.delay).await;
        Ok(Verdict::pass())
    }
}

/// Mock gate that blocks its thread before passing.
pub struct BlockingGate {
    name: String,
    delay: Duration,
}

impl BlockingGate {
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
        }
    }
}

#[async_trait]
impl Gate for BlockingGate {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, _case: &CaseLocation, _ctx: &EvalContext) -> Result<Verdict, GateError> {
        std::thread::sleep(self.delay);
        Ok(Verdict::pass())
    }
}

/// Mock claim verifier with a fixed answer.
pub struct StaticClaimVerifier {
    outcome: Result<bool, VerifierError>,
}

impl StaticClaimVerifier {
    pub fn accept_all() -> Self {
        Self { outcome: Ok(true) }
    }

    pub fn reject_all() -> Self {
        Self { outcome: Ok(false) }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(VerifierError::Unavailable(message.into())),
        }
    }

    pub fn rejecting(status: impl Into<String>) -> Self {
        Self {
            outcome: Err(VerifierError::Rejected(status.into())),
        }
    }
}

#[async_trait]
impl ClaimVerifier for StaticClaimVerifier {
    async fn verify(
        &self,
        claims: &[Claim],
        _api_key: &Secret,
    ) -> Result<Vec<ClaimJudgement>, VerifierError> {
        let supported = self.outcome.clone()?;
        Ok(claims
            .iter()
            .map(|c| ClaimJudgement {
                id: c.id.clone(),
                supported,
                note: (!supported).then(|| "not supported by cited sources".to_string()),
            })
            .collect())
    }
}

/// Write a minimal case that satisfies every built-in gate.
pub fn write_minimal_case(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir.join("findings"))?;
    std::fs::create_dir_all(dir.join("review"))?;

    std::fs::write(
        dir.join("tasks.json"),
        r#"{"tasks":[
            {"id":"T1","title":"Establish timeline","status":"done"},
            {"id":"T2","title":"Identify counterparties","status":"done"}
        ]}"#,
    )?;
    std::fs::write(
        dir.join("findings/T1.md"),
        "The acquisition was announced on 3 March and closed on 28 March.\n",
    )?;
    std::fs::write(
        dir.join("findings/T2.md"),
        "Two counterparties are named in the registry filing.\n",
    )?;
    std::fs::write(
        dir.join("sources.json"),
        r#"{"sources":[
            {"id":"S1","url":"https://example.com/press-release","captured":true},
            {"id":"S2","url":"https://example.com/registry-filing","captured":true}
        ]}"#,
    )?;
    std::fs::write(
        dir.join("report.md"),
        "# Case Report\n\n\
         ## Summary\n\n\
         The acquisition closed in March [@S1]. Counterparties were identified \
         from the registry filing [@S2].\n\n\
         ## Findings\n\n\
         The timeline comes from the press release [@S1]. Two counterparties are \
         confirmed by the filing [@S2].\n\n\
         ## Sources\n\n\
         - S1 press release\n\
         - S2 registry filing\n",
    )?;
    std::fs::write(
        dir.join("review/adversarial.md"),
        "Could the press release date be wrong? The registry filing independently \
         records the same closing date, so the timeline holds. Could a third \
         counterparty exist? No filing mentions one.\n",
    )?;
    std::fs::write(
        dir.join("contradictions.json"),
        r#"{"contradictions":[{"id":"C1","summary":"closing date differs in blog post","resolved":true}]}"#,
    )?;
    std::fs::write(dir.join("legal.json"), r#"{"reviewed":true,"issues":[]}"#)?;
    std::fs::write(
        dir.join("claims.json"),
        r#"{"claims":[
            {"id":"K1","text":"The acquisition closed in March.","source_ids":["S1"]},
            {"id":"K2","text":"There are two counterparties.","source_ids":["S2"]}
        ]}"#,
    )?;
    Ok(())
}
