//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status codes, jitter)
//! - Check that addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HarnessConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;
use url::Url;

use crate::config::schema::HarnessConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("server.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("client.base_url '{0}' is not an http(s) URL")]
    InvalidBaseUrl(String),

    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("retries.jitter must be within [0, 1] (got {0})")]
    JitterOutOfRange(f64),

    #[error("retries.status_forcelist contains invalid status code {0}")]
    InvalidStatusCode(u16),

    #[error("retries.allowed_methods contains invalid method '{0}'")]
    InvalidMethod(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &HarnessConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.server.bind_address.clone()));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::NonPositive {
            field: "server.request_timeout_secs",
            value: 0.0,
        });
    }

    match Url::parse(&config.client.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(config.client.base_url.clone())),
    }
    check_positive(&mut errors, "client.default_timeout_secs", config.client.default_timeout_secs);

    let retries = &config.retries;
    check_positive(&mut errors, "retries.backoff_base_secs", retries.backoff_base_secs);
    check_positive(&mut errors, "retries.max_backoff_secs", retries.max_backoff_secs);
    if !(0.0..=1.0).contains(&retries.jitter) {
        errors.push(ValidationError::JitterOutOfRange(retries.jitter));
    }
    for &code in &retries.status_forcelist {
        if !(100..=599).contains(&code) {
            errors.push(ValidationError::InvalidStatusCode(code));
        }
    }
    for method in &retries.allowed_methods {
        if Method::from_bytes(method.to_ascii_uppercase().as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &'static str, value: f64) {
    // NaN fails this comparison too.
    if !(value > 0.0) || !value.is_finite() {
        errors.push(ValidationError::NonPositive { field, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&HarnessConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = HarnessConfig::default();
        config.server.bind_address = "not-an-addr".into();
        config.client.base_url = "ftp://example.com".into();
        config.client.default_timeout_secs = 0.0;
        config.retries.jitter = 1.5;
        config.retries.status_forcelist.push(700);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::InvalidBaseUrl("ftp://example.com".into())));
        assert!(errors.contains(&ValidationError::InvalidStatusCode(700)));
        assert!(errors.contains(&ValidationError::JitterOutOfRange(1.5)));
    }

    #[test]
    fn test_rejects_nan_timeout() {
        let mut config = HarnessConfig::default();
        config.client.default_timeout_secs = f64::NAN;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::NonPositive { field: "client.default_timeout_secs", .. }
        ));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = HarnessConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidMetricsAddress("bogus".into())])
        );
    }
}
