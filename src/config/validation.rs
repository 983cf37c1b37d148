//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and URLs. All errors are
//! collected, not just the first.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
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

fn check_http_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e))),
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be > 0"));
    }
    if config.server.event_buffer == 0 {
        errors.push(ValidationError::new("server.event_buffer", "must be > 0"));
    }

    // Blank means quoting is disabled, same as leaving it out.
    if let Some(base_url) = config.swap.base_url.as_deref().filter(|url| !url.trim().is_empty()) {
        check_http_url(&mut errors, "swap.base_url", base_url);
    }
    if config.swap.timeout_ms == 0 {
        errors.push(ValidationError::new("swap.timeout_ms", "must be > 0"));
    }
    if config.swap.default_slippage_bps > 10_000 {
        errors.push(ValidationError::new("swap.default_slippage_bps", "must be <= 10000"));
    }

    check_http_url(&mut errors, "chain.bridge_url", &config.chain.bridge_url);
    for (i, failover) in config.chain.failover_urls.iter().enumerate() {
        check_http_url(&mut errors, &format!("chain.failover_urls[{}]", i), failover);
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be > 0"));
    }
    if config.chain.finality_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.finality_timeout_secs", "must be > 0"));
    }
    if config.chain.poll_interval_ms == 0 {
        errors.push(ValidationError::new("chain.poll_interval_ms", "must be > 0"));
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

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.server.bind_address = "nowhere".into();
        config.swap.base_url = Some("ftp://swap".into());
        config.chain.failover_urls = vec!["not a url".into()];
        config.chain.poll_interval_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "server.bind_address",
                "swap.base_url",
                "chain.failover_urls[0]",
                "chain.poll_interval_ms"
            ]
        );
    }

    #[test]
    fn test_blank_swap_url_is_valid() {
        let mut config = AppConfig::default();
        config.swap.base_url = Some(String::new());
        assert_eq!(validate_config(&config), Ok(()));
        config.swap.base_url = Some("   ".into());
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());
        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
