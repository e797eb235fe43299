//! Claims gate and the external claim verification service.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::artifacts::{self, Claim, ClaimList, SourceList};
use crate::config::VerifierConfig;
use crate::context::{CaseLocation, CredentialClass, EvalContext, Secret};
use crate::error::GateError;
use crate::gaps::GapType;
use crate::traits::Gate;
use crate::verdict::{Finding, Verdict};

/// The verifier's judgement on a single claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimJudgement {
    pub id: String,
    pub supported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifierError {
    /// Transport failure or a non-success status.
    #[error("verification service unreachable: {0}")]
    Unavailable(String),

    /// The service refused our credential.
    #[error("verification service rejected the credential: {0}")]
    Rejected(String),

    /// The service answered with something we cannot read.
    #[error("unexpected verification response: {0}")]
    Protocol(String),
}

/// Checks claims against their cited sources.
#[async_trait]
pub trait ClaimVerifier: Send + Sync {
    async fn verify(
        &self,
        claims: &[Claim],
        api_key: &Secret,
    ) -> Result<Vec<ClaimJudgement>, VerifierError>;
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    claims: Vec<RequestClaim<'a>>,
}

#[derive(Serialize)]
struct RequestClaim<'a> {
    id: &'a str,
    text: &'a str,
    sources: &'a [String],
}

#[derive(Deserialize)]
struct VerifyResponse {
    results: Vec<ClaimJudgement>,
}

/// `ClaimVerifier` backed by the HTTP verification service.
pub struct HttpClaimVerifier {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpClaimVerifier {
    pub fn new(config: &VerifierConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }
}

#[async_trait]
impl ClaimVerifier for HttpClaimVerifier {
    async fn verify(
        &self,
        claims: &[Claim],
        api_key: &Secret,
    ) -> Result<Vec<ClaimJudgement>, VerifierError> {
        let body = VerifyRequest {
            claims: claims
                .iter()
                .map(|c| RequestClaim {
                    id: &c.id,
                    text: &c.text,
                    sources: &c.source_ids,
                })
                .collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| VerifierError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(VerifierError::Rejected(status.to_string()));
        }
        if !status.is_success() {
            return Err(VerifierError::Unavailable(format!("{} returned {status}", self.endpoint)));
        }

        let parsed: VerifyResponse = response
            .json()
            .await
            .map_err(|e| VerifierError::Protocol(e.to_string()))?;
        Ok(parsed.results)
    }
}

/// Every claim cites recorded sources and is accepted by the verifier.
pub struct ClaimsGate {
    verifier: Arc<dyn ClaimVerifier>,
}

impl ClaimsGate {
    pub fn new(verifier: Arc<dyn ClaimVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl Gate for ClaimsGate {
    fn name(&self) -> &str {
        "claims"
    }

    async fn evaluate(&self, case: &CaseLocation, ctx: &EvalContext) -> Result<Verdict, GateError> {
        let Some(api_key) = ctx.credentials.get(CredentialClass::VerificationApi) else {
            return Ok(Verdict::missing_credential(CredentialClass::VerificationApi));
        };

        let list: ClaimList = artifacts::read_json(case, artifacts::CLAIMS).await?;
        let sources: SourceList = artifacts::read_json(case, artifacts::SOURCES).await?;
        let known: HashSet<&str> = sources.sources.iter().map(|s| s.id.as_str()).collect();

        let mut findings = Vec::new();
        let mut checkable = Vec::new();
        for claim in &list.claims {
            let unknown: Vec<&str> = claim
                .source_ids
                .iter()
                .map(String::as_str)
                .filter(|id| !known.contains(id))
                .collect();
            if claim.source_ids.is_empty() {
                findings.push(Finding::new(
                    GapType::UnsupportedClaim,
                    &claim.id,
                    format!("claim {} cites no sources", claim.id),
                ));
            } else if !unknown.is_empty() {
                findings.push(Finding::new(
                    GapType::UnsupportedClaim,
                    &claim.id,
                    format!("claim {} cites unknown sources: {}", claim.id, unknown.join(", ")),
                ));
            } else {
                checkable.push(claim.clone());
            }
        }

        if !checkable.is_empty() {
            debug!(claims = checkable.len(), "sending claims for verification");
            let judgements = match self.verifier.verify(&checkable, api_key).await {
                Ok(judgements) => judgements,
                Err(VerifierError::Rejected(status)) => {
                    return Ok(Verdict::invalid_credential(CredentialClass::VerificationApi, status));
                }
                Err(e @ VerifierError::Unavailable(_)) => return Ok(Verdict::unavailable(e)),
                Err(e @ VerifierError::Protocol(_)) => return Err(GateError::Verifier(e.to_string())),
            };
            let by_id: HashMap<&str, &ClaimJudgement> =
                judgements.iter().map(|j| (j.id.as_str(), j)).collect();

            for claim in &checkable {
                let Some(judgement) = by_id.get(claim.id.as_str()) else {
                    return Err(GateError::Verifier(format!(
                        "no judgement returned for claim {}",
                        claim.id
                    )));
                };
                if !judgement.supported {
                    let note = judgement.note.as_deref().unwrap_or("not supported");
                    findings.push(Finding::new(
                        GapType::UnsupportedClaim,
                        &claim.id,
                        format!("claim {}: {note}", claim.id),
                    ));
                }
            }
        }

        let total = list.claims.len();
        if findings.is_empty() {
            return Ok(Verdict::pass().with_detail("claims", total));
        }
        Ok(Verdict::content_failure(format!(
            "{} of {} claims unsupported",
            findings.len(),
            total
        ))
        .with_detail("claims", total)
        .with_findings(findings))
    }
}
