//! Configuration file loading.

use std::path::Path;

use casegate::CaseGateConfig;
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Load configuration from an optional TOML file.
///
/// Without a path the defaults apply. Keys missing from the file fall back to
/// their defaults; the result is validated before use.
pub fn load(path: Option<&Path>) -> CliResult<CaseGateConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                CliError::Config(format!("cannot read {}: {e}", path.display()))
            })?;
            debug!(path = %path.display(), "Loaded configuration file");
            toml::from_str(&text)?
        }
        None => CaseGateConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
