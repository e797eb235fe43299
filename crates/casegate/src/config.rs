//! Verification configuration.
//!
//! Built once at the call boundary and threaded through the runner and the
//! gates explicitly. Every field has a default so partial config files work.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for a verification run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaseGateConfig {
    /// Runner behaviour.
    pub runner: RunnerConfig,

    /// Thresholds consumed by the built-in gates.
    pub thresholds: Thresholds,

    /// Claim verification service.
    pub verifier: VerifierConfig,
}

impl CaseGateConfig {
    /// Reject values that would make every run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runner.gate_timeout_ms == 0 {
            return Err(ConfigError::Invalid("runner.gate_timeout_ms must be > 0".into()));
        }
        if let Some((name, _)) = self
            .runner
            .gate_timeouts_ms
            .iter()
            .find(|(_, ms)| **ms == 0)
        {
            return Err(ConfigError::Invalid(format!(
                "runner.gate_timeouts_ms.{name} must be > 0"
            )));
        }
        let density = self.thresholds.min_citations_per_100_words;
        if !density.is_finite() || density < 0.0 {
            return Err(ConfigError::Invalid(
                "thresholds.min_citations_per_100_words must be a non-negative number".into(),
            ));
        }
        if self.verifier.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "verifier.request_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Timeout applied to every gate without an override.
    pub gate_timeout_ms: u64,

    /// Per-gate timeout overrides keyed by gate name.
    pub gate_timeouts_ms: BTreeMap<String, u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            gate_timeout_ms: 60_000,
            gate_timeouts_ms: BTreeMap::new(),
        }
    }
}

impl RunnerConfig {
    /// Effective timeout for a gate.
    pub fn timeout_for(&self, gate: &str) -> Duration {
        let ms = self
            .gate_timeouts_ms
            .get(gate)
            .copied()
            .unwrap_or(self.gate_timeout_ms);
        Duration::from_millis(ms)
    }
}

/// Numeric knobs for the built-in gates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum `[@ID]` citations per 100 words of `report.md`.
    pub min_citations_per_100_words: f64,

    /// Minimum word count of the adversarial review.
    pub min_adversarial_words: usize,

    /// Headings `report.md` must contain.
    pub required_sections: Vec<String>,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_citations_per_100_words: 1.0,
            min_adversarial_words: 20,
            required_sections: vec!["Summary".into(), "Findings".into(), "Sources".into()],
        }
    }
}

/// Claim verification service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerifierConfig {
    pub endpoint: String,
    pub request_timeout_ms: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://verify.casegate.dev/v1/claims".into(),
            request_timeout_ms: 20_000,
        }
    }
}
