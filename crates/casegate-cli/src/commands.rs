//! Subcommand implementations.
//!
//! Each command returns the process exit code; nothing is printed until the
//! evaluation has completed, so a cancelled run leaves stdout empty.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use casegate::{CaseLocation, CaseVerifier};
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::output::{self, GateRow, OutputFormat};

fn case_location(dir: &Path) -> CliResult<CaseLocation> {
    if !dir.is_dir() {
        return Err(CliError::InvalidInput(format!(
            "case directory not found: {}",
            dir.display()
        )));
    }
    Ok(CaseLocation::new(dir))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// `verify`: evaluate and print the full report. Succeeds iff the case passed.
pub async fn verify(
    verifier: &CaseVerifier,
    case_dir: &Path,
    format: OutputFormat,
    cancel: impl Future<Output = ()>,
) -> CliResult<ExitCode> {
    let case = case_location(case_dir)?;
    let report = verifier.verify_until(&case, cancel).await?;
    println!("{}", output::render_report(&report, format)?);
    Ok(exit_code(report.overall_passed))
}

/// `gaps`: evaluate and print the gap backlog, optionally writing it as JSON.
/// Succeeds iff there is no blocking gap.
pub async fn gaps(
    verifier: &CaseVerifier,
    case_dir: &Path,
    out: Option<PathBuf>,
    format: OutputFormat,
    cancel: impl Future<Output = ()>,
) -> CliResult<ExitCode> {
    let case = case_location(case_dir)?;
    let gaps = verifier.generate_gaps_until(&case, cancel).await?;

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(&gaps)?;
        std::fs::write(&path, json).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), gaps = gaps.len(), "Wrote gap list");
    }

    println!("{}", output::render_gaps(&gaps, format)?);
    Ok(exit_code(gaps.blocking.is_empty()))
}

/// `gates`: list registered gates in registry order with their timeouts.
pub fn gates(verifier: &CaseVerifier, format: OutputFormat) -> CliResult<ExitCode> {
    println!("{}", output::render_gates(&gate_rows(verifier), format)?);
    Ok(ExitCode::SUCCESS)
}

fn gate_rows(verifier: &CaseVerifier) -> Vec<GateRow> {
    let config = verifier.runner_config();
    verifier
        .registry()
        .names()
        .map(|name| GateRow::new(name, config.timeout_for(name)))
        .collect()
}
