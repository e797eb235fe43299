use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Thresholds;

/// Environment variable holding the claim verification API key.
pub const VERIFY_API_KEY_ENV: &str = "CASEGATE_VERIFY_API_KEY";

/// Location of a case: the directory holding its artifacts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseLocation(PathBuf);

impl CaseLocation {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self(dir.into())
    }

    pub fn dir(&self) -> &Path {
        &self.0
    }

    /// Path of an artifact relative to the case directory.
    pub fn artifact(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.0.join(relative)
    }
}

impl fmt::Display for CaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A secret value. Redacted in `Debug`, never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Credential classes some gates require.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialClass {
    VerificationApi,
}

impl CredentialClass {
    /// Environment variable the credential is resolved from.
    pub fn env_var(self) -> &'static str {
        match self {
            CredentialClass::VerificationApi => VERIFY_API_KEY_ENV,
        }
    }
}

impl fmt::Display for CredentialClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialClass::VerificationApi => {
                write!(f, "verification API key ({})", self.env_var())
            }
        }
    }
}

/// Environment-derived secrets, resolved once at the call boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub verification_api_key: Option<Secret>,
}

impl Credentials {
    /// Resolve credentials from the process environment.
    ///
    /// Blank values count as absent.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve credentials through an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let verification_api_key = lookup(CredentialClass::VerificationApi.env_var())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Secret::new);
        Self {
            verification_api_key,
        }
    }

    pub fn with_verification_api_key(mut self, key: impl Into<String>) -> Self {
        self.verification_api_key = Some(Secret::new(key));
        self
    }

    pub fn get(&self, class: CredentialClass) -> Option<&Secret> {
        match class {
            CredentialClass::VerificationApi => self.verification_api_key.as_ref(),
        }
    }
}

/// Everything a gate may consult besides the case artifacts.
#[derive(Clone, Debug, Default)]
pub struct EvalContext {
    pub credentials: Credentials,
    pub thresholds: Thresholds,
}

impl EvalContext {
    pub fn new(credentials: Credentials, thresholds: Thresholds) -> Self {
        Self {
            credentials,
            thresholds,
        }
    }
}
