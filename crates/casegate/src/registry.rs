//! Gate registry.
//!
//! The fixed, ordered set of gates a run evaluates. Built once before any
//! run and read-only afterwards.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::CaseGateConfig;
use crate::error::RegistryError;
use crate::gates::{
    AdversarialGate, ClaimVerifier, ClaimsGate, ContentGate, ContradictionsGate, CoverageGate,
    HttpClaimVerifier, LegalGate, RigorGate, SourcesGate, TasksGate,
};
use crate::traits::Gate;

/// Canonical order of the built-in gates.
pub const STANDARD_GATES: [&str; 9] = [
    "coverage",
    "tasks",
    "adversarial",
    "sources",
    "content",
    "contradictions",
    "rigor",
    "legal",
    "claims",
];

/// A gate bound to the name captured at registration time.
#[derive(Clone)]
pub struct RegisteredGate {
    name: String,
    gate: Arc<dyn Gate>,
}

impl RegisteredGate {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gate(&self) -> &Arc<dyn Gate> {
        &self.gate
    }
}

impl std::fmt::Debug for RegisteredGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredGate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Immutable, ordered mapping from gate name to implementation.
#[derive(Clone, Debug)]
pub struct GateRegistry {
    gates: Vec<RegisteredGate>,
}

impl GateRegistry {
    pub fn builder() -> GateRegistryBuilder {
        GateRegistryBuilder::default()
    }

    /// The nine built-in gates, claims verified over HTTP.
    pub fn standard(config: &CaseGateConfig) -> Result<Self, RegistryError> {
        Self::standard_with_verifier(Arc::new(HttpClaimVerifier::new(&config.verifier)))
    }

    /// The nine built-in gates with a caller-supplied claim verifier.
    pub fn standard_with_verifier(verifier: Arc<dyn ClaimVerifier>) -> Result<Self, RegistryError> {
        Self::builder()
            .register(CoverageGate)?
            .register(TasksGate)?
            .register(AdversarialGate)?
            .register(SourcesGate)?
            .register(ContentGate)?
            .register(ContradictionsGate)?
            .register(RigorGate)?
            .register(LegalGate)?
            .register(ClaimsGate::new(verifier))
            .map(GateRegistryBuilder::build)
    }

    /// Gate names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.gates.iter().map(|g| g.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredGate> {
        self.gates.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Gate>> {
        self.gates.iter().find(|g| g.name == name).map(|g| &g.gate)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.gates.iter().any(|g| g.name == name)
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

/// Builder for [`GateRegistry`]. Rejects empty and duplicate names.
#[derive(Debug, Default)]
pub struct GateRegistryBuilder {
    gates: Vec<RegisteredGate>,
    seen: HashSet<String>,
}

impl GateRegistryBuilder {
    /// Register a gate under its own name.
    pub fn register(self, gate: impl Gate + 'static) -> Result<Self, RegistryError> {
        self.register_arc(Arc::new(gate))
    }

    /// Register an already shared gate under its own name.
    pub fn register_arc(self, gate: Arc<dyn Gate>) -> Result<Self, RegistryError> {
        let name = gate.name().to_string();
        self.register_as(name, gate)
    }

    /// Register a gate under an explicit name.
    pub fn register_as(
        mut self,
        name: impl Into<String>,
        gate: Arc<dyn Gate>,
    ) -> Result<Self, RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if !self.seen.insert(name.clone()) {
            return Err(RegistryError::Duplicate(name));
        }
        self.gates.push(RegisteredGate { name, gate });
        Ok(self)
    }

    pub fn build(self) -> GateRegistry {
        GateRegistry { gates: self.gates }
    }
}
