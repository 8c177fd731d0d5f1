//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, backoff rate >= 1)
//! - Check that every HTTP target has a usable URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CoordinatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{CoordinatorConfig, TargetConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration for values the coordinator cannot run with.
pub fn validate_config(config: &CoordinatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be greater than 0"));
    }

    if config.store.table_name.trim().is_empty() {
        errors.push(ValidationError::new("store.table_name", "must not be empty"));
    }
    if config.store.timeout_ms == 0 {
        errors.push(ValidationError::new("store.timeout_ms", "must be greater than 0"));
    }

    if config.circuit.name.trim().is_empty() {
        errors.push(ValidationError::new("circuit.name", "must not be empty"));
    }
    if config.circuit.time_to_live.is_zero() {
        errors.push(ValidationError::new("circuit.time_to_live", "must be a positive duration"));
    }

    if config.retry.max_attempts == 0 {
        errors.push(ValidationError::new("retry.max_attempts", "must allow at least one attempt"));
    }
    if !config.retry.backoff_rate.is_finite() || config.retry.backoff_rate < 1.0 {
        errors.push(ValidationError::new(
            "retry.backoff_rate",
            format!("{} must be a finite number >= 1.0", config.retry.backoff_rate),
        ));
    }
    if config.retry.max_delay_ms == Some(0) {
        errors.push(ValidationError::new("retry.max_delay_ms", "must be greater than 0 when set"));
    }

    if config.invocation.timeout_secs == 0 {
        errors.push(ValidationError::new("invocation.timeout_secs", "must be greater than 0"));
    }

    for (name, target) in &config.targets {
        if let TargetConfig::Http { url, timeout_secs } = target {
            match url::Url::parse(url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => errors.push(ValidationError::new(
                    format!("targets.{}.url", name),
                    format!("unsupported scheme '{}'", parsed.scheme()),
                )),
                Err(e) => errors.push(ValidationError::new(
                    format!("targets.{}.url", name),
                    format!("'{}' is not a URL: {}", url, e),
                )),
            }
            if *timeout_secs == Some(0) {
                errors.push(ValidationError::new(
                    format!("targets.{}.timeout_secs", name),
                    "must be greater than 0 when set",
                ));
            }
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::duration::GoDuration;
    use std::time::Duration;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&CoordinatorConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = CoordinatorConfig::default();
        config.circuit.name = "  ".to_string();
        config.circuit.time_to_live = GoDuration::from(Duration::ZERO);
        config.retry.max_attempts = 0;
        config.retry.backoff_rate = 0.5;
        config.invocation.timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "circuit.name",
                "circuit.time_to_live",
                "retry.max_attempts",
                "retry.backoff_rate",
                "invocation.timeout_secs",
            ]
        );
    }

    #[test]
    fn test_http_target_urls() {
        let mut config = CoordinatorConfig::default();
        config.targets.insert(
            "Good".to_string(),
            TargetConfig::Http { url: "https://example.com/op".to_string(), timeout_secs: None },
        );
        config.targets.insert(
            "Bad".to_string(),
            TargetConfig::Http { url: "not a url".to_string(), timeout_secs: Some(0) },
        );
        config.targets.insert(
            "Ftp".to_string(),
            TargetConfig::Http { url: "ftp://example.com".to_string(), timeout_secs: None },
        );

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.field == "targets.Bad.url"));
        assert!(errors.iter().any(|e| e.field == "targets.Bad.timeout_secs"));
        assert!(errors.iter().any(|e| e.field == "targets.Ftp.url" && e.message.contains("ftp")));
    }
}
