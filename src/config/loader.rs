//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::duration::DurationParseError;
use crate::config::schema::CoordinatorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Table holding the circuit rows.
pub const ENV_TABLE_NAME: &str = "DDB_TABLE_NAME";
/// Circuit name queried and tripped by default.
pub const ENV_CIRCUIT_NAME: &str = "DDB_CIRCUIT_NAME";
/// Cooldown applied on trip, as a duration string.
pub const ENV_TIME_TO_LIVE: &str = "DDB_TIME_TO_LIVE_DURATION";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{var}: {source}")]
    Env {
        var: &'static str,
        #[source]
        source: DurationParseError,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve the configuration used at process start.
///
/// Starts from the file when one is given (defaults otherwise), applies the
/// `DDB_*` environment overrides and validates the result.
pub fn resolve_config(path: Option<&Path>) -> Result<CoordinatorConfig, ConfigError> {
    resolve_config_with(path, |var| std::env::var(var).ok())
}

/// [`resolve_config`] with environment variables read through `lookup`.
pub fn resolve_config_with<F>(path: Option<&Path>, lookup: F) -> Result<CoordinatorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => CoordinatorConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut CoordinatorConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(table) = lookup(ENV_TABLE_NAME).filter(|v| !v.is_empty()) {
        tracing::debug!(table = %table, "Table name taken from environment");
        config.store.table_name = table;
    }

    if let Some(circuit) = lookup(ENV_CIRCUIT_NAME).filter(|v| !v.is_empty()) {
        tracing::debug!(circuit = %circuit, "Circuit name taken from environment");
        config.circuit.name = circuit;
    }

    if let Some(ttl) = lookup(ENV_TIME_TO_LIVE).filter(|v| !v.is_empty()) {
        config.circuit.time_to_live = ttl.parse().map_err(|source| ConfigError::Env {
            var: ENV_TIME_TO_LIVE,
            source,
        })?;
        tracing::debug!(time_to_live = %config.circuit.time_to_live, "Cooldown taken from environment");
    }

    Ok(())
}
