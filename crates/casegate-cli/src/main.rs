//! Casegate CLI - verify research cases against their quality gates
//!
//! - `verify` runs every gate and prints the case report
//! - `gaps` prints the remediation backlog derived from failed gates
//! - `gates` lists the registered gates and their timeouts

use std::path::PathBuf;
use std::process::ExitCode;

use casegate::{CaseVerifier, Credentials};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use error::CliResult;

/// Exit status after Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

/// Casegate CLI application
#[derive(Parser)]
#[command(name = "casegate")]
#[command(about = "Casegate - verification gates for case-based research", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "CASEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, value_enum, default_value_t = output::OutputFormat::Text)]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Evaluate a case and print the report
    Verify {
        /// Case directory
        case_dir: PathBuf,
    },

    /// Evaluate a case and print its gap backlog
    Gaps {
        /// Case directory
        case_dir: PathBuf,

        /// Also write the gap list as JSON to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List registered gates
    Gates,
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = config::load(cli.config.as_deref())?;
    let verifier = CaseVerifier::from_config(&config, Credentials::from_env())?;

    match cli.command {
        Commands::Verify { case_dir } => {
            commands::verify(&verifier, &case_dir, cli.output, interrupted()).await
        }
        Commands::Gaps { case_dir, out } => {
            commands::gaps(&verifier, &case_dir, out, cli.output, interrupted()).await
        }
        Commands::Gates => commands::gates(&verifier, cli.output),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) if e.is_cancelled() => {
            output::print_warning("Interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            output::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
