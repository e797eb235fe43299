//! Gate verdicts.
//!
//! Every gate outcome, infrastructure or content, is expressed through the
//! single [`Verdict`] type so the runner's isolation logic stays uniform.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::CredentialClass;
use crate::gaps::GapType;

/// Diagnostic data attached to a verdict. Opaque to the orchestrator.
pub type Details = serde_json::Map<String, serde_json::Value>;

/// Why a gate did not pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// The case artifacts do not satisfy the check.
    Content,
    /// A required credential is absent.
    MissingCredential,
    /// A credential was supplied but refused by the service it is for.
    InvalidCredential,
    /// An external dependency could not be reached.
    Unavailable,
    /// The gate returned an error (I/O, malformed input).
    Execution,
    /// The gate exceeded its timeout.
    Timeout,
    /// The gate panicked.
    Panicked,
}

impl FailureCategory {
    /// Infrastructure failures say nothing about the case content.
    pub fn is_infrastructure(self) -> bool {
        matches!(
            self,
            FailureCategory::MissingCredential
                | FailureCategory::InvalidCredential
                | FailureCategory::Unavailable
                | FailureCategory::Timeout
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureCategory::Content => "content",
            FailureCategory::MissingCredential => "missing_credential",
            FailureCategory::InvalidCredential => "invalid_credential",
            FailureCategory::Unavailable => "unavailable",
            FailureCategory::Execution => "execution",
            FailureCategory::Timeout => "timeout",
            FailureCategory::Panicked => "panicked",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A specific item a failing gate points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: GapType,
    pub target: String,
    pub message: String,
}

impl Finding {
    pub fn new(kind: GapType, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            message: message.into(),
        }
    }
}

/// Outcome of one gate evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    pub reason: Option<String>,
    pub category: Option<FailureCategory>,
    pub details: Option<Details>,
    pub findings: Vec<Finding>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
            category: None,
            details: None,
            findings: Vec::new(),
        }
    }

    /// The case content does not satisfy the check.
    pub fn content_failure(reason: impl Into<String>) -> Self {
        Self::fail(FailureCategory::Content, reason.into())
    }

    pub fn missing_credential(class: CredentialClass) -> Self {
        Self::fail(
            FailureCategory::MissingCredential,
            format!("missing credential: {class} is not set"),
        )
    }

    pub fn invalid_credential(class: CredentialClass, detail: impl fmt::Display) -> Self {
        Self::fail(
            FailureCategory::InvalidCredential,
            format!("invalid credential: {class} was rejected ({detail})"),
        )
    }

    pub fn unavailable(what: impl fmt::Display) -> Self {
        Self::fail(FailureCategory::Unavailable, format!("unavailable: {what}"))
    }

    pub(crate) fn execution_error(error: impl fmt::Display) -> Self {
        Self::fail(FailureCategory::Execution, format!("execution error: {error}"))
    }

    pub(crate) fn timed_out(timeout_ms: u64) -> Self {
        Self::fail(FailureCategory::Timeout, format!("timed out after {timeout_ms}ms"))
    }

    pub(crate) fn panicked(message: impl fmt::Display) -> Self {
        Self::fail(FailureCategory::Panicked, format!("gate panicked: {message}"))
    }

    fn fail(category: FailureCategory, reason: String) -> Self {
        Self {
            passed: false,
            reason: Some(reason),
            category: Some(category),
            details: None,
            findings: Vec::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details
            .get_or_insert_with(Details::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_findings(mut self, findings: impl IntoIterator<Item = Finding>) -> Self {
        self.findings.extend(findings);
        self
    }
}
