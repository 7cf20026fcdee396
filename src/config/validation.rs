//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and address/URL syntax
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("upstream.base_url {0:?} is not a valid URL")]
    InvalidBaseUrl(String),

    #[error("upstream.base_url must use http or https, got {0:?}")]
    UnsupportedScheme(String),

    #[error("upstream.access_token must not be empty")]
    EmptyAccessToken,

    #[error("upstream.access_token contains characters that cannot appear in a header")]
    MalformedAccessToken,

    #[error("retries.initial_delay_ms must be greater than zero")]
    ZeroInitialDelay,
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(_) => {}
        Err(_) => {
            errors.push(ValidationError::InvalidBaseUrl(
                config.upstream.base_url.clone(),
            ));
        }
    }

    let token = &config.upstream.access_token;
    if token.is_empty() {
        errors.push(ValidationError::EmptyAccessToken);
    } else if token.bytes().any(|b| !(0x21..=0x7e).contains(&b)) {
        errors.push(ValidationError::MalformedAccessToken);
    }

    if config.retries.initial_delay_ms == 0 {
        errors.push(ValidationError::ZeroInitialDelay);
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

    fn valid_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.access_token = "sekrit".to_string();
        config
    }

    #[test]
    fn default_config_with_token_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = valid_config();
        config.upstream.base_url = "::: not a url :::".to_string();
        config.upstream.access_token = String::new();
        config.retries.initial_delay_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rejects_non_http_scheme() {
        let mut config = valid_config();
        config.upstream.base_url = "ftp://oauth.reddit.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::UnsupportedScheme(_)));
    }

    #[test]
    fn rejects_token_with_header_unsafe_characters() {
        let mut config = valid_config();
        config.upstream.access_token = "tok\nen".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::MalformedAccessToken));
    }

    #[test]
    fn rejects_unparseable_bind_address() {
        let mut config = valid_config();
        config.listener.bind_address = "localhost".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidBindAddress(_)));
    }
}
