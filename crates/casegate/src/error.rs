use std::path::PathBuf;

use thiserror::Error;

/// Errors a gate may return from `evaluate`.
///
/// These never escape a run: the runner recovers every `GateError` into a
/// failing report with the `Execution` category.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("required artifact missing: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {}: {reason}", path.display())]
    MalformedArtifact { path: PathBuf, reason: String },

    #[error("verifier error: {0}")]
    Verifier(String),

    #[error("{0}")]
    Other(String),
}

/// Errors raised while building a [`GateRegistry`](crate::GateRegistry).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("gate name must not be empty")]
    EmptyName,

    #[error("gate already registered: {0}")]
    Duplicate(String),
}

/// Fatal orchestration errors.
///
/// Anything here terminates the invocation: it is either an explicit
/// cancellation or a defect in the core or one of its collaborators.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("evaluation cancelled")]
    Cancelled,

    #[error("contract violation: {0}")]
    Contract(String),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Errors from loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_error_messages_name_the_artifact() {
        let err = GateError::MissingArtifact(PathBuf::from("case/tasks.json"));
        assert_eq!(err.to_string(), "required artifact missing: case/tasks.json");

        let err = GateError::MalformedArtifact {
            path: PathBuf::from("case/sources.json"),
            reason: "expected an object".into(),
        };
        assert!(err.to_string().contains("case/sources.json"));
        assert!(err.to_string().contains("expected an object"));
    }

    #[test]
    fn registry_error_converts_into_orchestrator_error() {
        let err: OrchestratorError = RegistryError::Duplicate("claims".into()).into();
        assert!(matches!(err, OrchestratorError::Registry(_)));
        assert!(err.to_string().contains("claims"));
    }
}
