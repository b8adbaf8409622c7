//! Subcommand handlers

pub mod config;
pub mod list;
pub mod run;

use std::path::Path;

use tracing::debug;

use invitecheck_core::config::HarnessConfig;

use crate::error::CliError;

/// Load the effective configuration.
///
/// With a path: file + env overrides. Without: defaults + env overrides.
pub async fn load_config(path: Option<&Path>) -> Result<HarnessConfig, CliError> {
    let config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration file");
            HarnessConfig::load(path).await?
        }
        None => {
            debug!("no configuration file given, using defaults");
            HarnessConfig::from_env()?
        }
    };
    Ok(config)
}

/// Human-readable name of where the configuration came from.
pub fn source_name(path: Option<&Path>) -> String {
    path.map_or_else(
        || "(defaults + environment)".to_owned(),
        |p| p.display().to_string(),
    )
}
