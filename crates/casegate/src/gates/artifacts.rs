//! Read-only access to case artifacts.
//!
//! Gates never write; every helper here opens a file, reads it whole and
//! closes it.

use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::context::CaseLocation;
use crate::error::GateError;

pub const TASKS: &str = "tasks.json";
pub const SOURCES: &str = "sources.json";
pub const FINDINGS_DIR: &str = "findings";
pub const REPORT: &str = "report.md";
pub const ADVERSARIAL_REVIEW: &str = "review/adversarial.md";
pub const CONTRADICTIONS: &str = "contradictions.json";
pub const LEGAL: &str = "legal.json";
pub const CLAIMS: &str = "claims.json";

/// Whether `id` can name a file inside an artifact directory: non-empty,
/// no path separators, no parent references.
pub fn is_plain_file_stem(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\']) && !id.contains("..")
}

/// Read a text artifact, `None` when it does not exist.
pub async fn read_text_optional(
    case: &CaseLocation,
    relative: impl AsRef<Path>,
) -> Result<Option<String>, GateError> {
    let path = case.artifact(relative);
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(GateError::Io { path, source }),
    }
}

/// Read a required text artifact.
pub async fn read_text(case: &CaseLocation, relative: impl AsRef<Path>) -> Result<String, GateError> {
    let relative = relative.as_ref();
    read_text_optional(case, relative)
        .await?
        .ok_or_else(|| GateError::MissingArtifact(case.artifact(relative)))
}

/// Read and parse a JSON artifact, `None` when it does not exist.
pub async fn read_json_optional<T: DeserializeOwned>(
    case: &CaseLocation,
    relative: impl AsRef<Path>,
) -> Result<Option<T>, GateError> {
    let relative = relative.as_ref();
    let Some(text) = read_text_optional(case, relative).await? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| GateError::MalformedArtifact {
            path: case.artifact(relative),
            reason: e.to_string(),
        })
}

/// Read and parse a required JSON artifact.
pub async fn read_json<T: DeserializeOwned>(
    case: &CaseLocation,
    relative: impl AsRef<Path>,
) -> Result<T, GateError> {
    let relative = relative.as_ref();
    read_json_optional(case, relative)
        .await?
        .ok_or_else(|| GateError::MissingArtifact(case.artifact(relative)))
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Markdown heading titles (`#` through `######`), trimmed.
pub fn headings(markdown: &str) -> Vec<String> {
    markdown
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let hashes = line.chars().take_while(|c| *c == '#').count();
            if hashes == 0 || hashes > 6 {
                return None;
            }
            let rest = &line[hashes..];
            if !rest.starts_with(' ') {
                return None;
            }
            Some(rest.trim().trim_end_matches('#').trim().to_string())
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
}

impl Task {
    pub fn is_done(&self) -> bool {
        matches!(
            self.status.trim().to_ascii_lowercase().as_str(),
            "done" | "complete" | "completed"
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SourceList {
    pub sources: Vec<Source>,
}

#[derive(Debug, Deserialize)]
pub struct Source {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub captured: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContradictionList {
    #[serde(default)]
    pub contradictions: Vec<Contradiction>,
}

#[derive(Debug, Deserialize)]
pub struct Contradiction {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub resolved: bool,
}

#[derive(Debug, Deserialize)]
pub struct LegalReview {
    #[serde(default)]
    pub reviewed: bool,
    #[serde(default)]
    pub issues: Vec<LegalIssue>,
}

#[derive(Debug, Deserialize)]
pub struct LegalIssue {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub resolved: bool,
}

#[derive(Debug, Deserialize)]
pub struct ClaimList {
    pub claims: Vec<Claim>,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct Claim {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub source_ids: Vec<String>,
}
