//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check redirect destinations are present
//! - Check every exemption rule is well formed (globs compile)
//! - Detect ambiguous route identifiers
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::routing::GlobMatcher;
use crate::security::exemptions::GLOB_PREFIX;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("gate.login_url must not be empty")]
    EmptyLoginUrl,

    #[error("gate.subscription_redirect must not be empty")]
    EmptySubscriptionRedirect,

    #[error("gate.exempt_urls[{0}] is empty")]
    EmptyExemptRule(usize),

    #[error("gate.exempt_urls[{index}]: {reason}")]
    InvalidGlob { index: usize, reason: String },

    #[error("routes[{0}].path must not be empty")]
    EmptyRoutePath(usize),

    #[error("route identifier '{0}' is declared more than once")]
    DuplicateRoute(String),

    #[error("subscriber.header must not be empty")]
    EmptySubscriberHeader,
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.gate.login_url.trim().is_empty() {
        errors.push(ValidationError::EmptyLoginUrl);
    }
    if config.gate.subscription_redirect.trim().is_empty() {
        errors.push(ValidationError::EmptySubscriptionRedirect);
    }

    for (index, rule) in config.gate.exempt_urls.iter().enumerate() {
        if rule.is_empty() {
            errors.push(ValidationError::EmptyExemptRule(index));
            continue;
        }
        if let Some(pattern) = rule.strip_prefix(GLOB_PREFIX) {
            if pattern.is_empty() {
                errors.push(ValidationError::InvalidGlob {
                    index,
                    reason: "glob pattern is empty".to_string(),
                });
            } else if let Err(e) = GlobMatcher::new(pattern) {
                errors.push(ValidationError::InvalidGlob {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.path.is_empty() {
            errors.push(ValidationError::EmptyRoutePath(index));
        }
        if let Some(name) = &route.name {
            let id = match &route.namespace {
                Some(ns) => format!("{ns}:{name}"),
                None => name.clone(),
            };
            if !seen.insert(id.clone()) {
                errors.push(ValidationError::DuplicateRoute(id));
            }
        }
    }

    if config.subscriber.enabled && config.subscriber.header.trim().is_empty() {
        errors.push(ValidationError::EmptySubscriberHeader);
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
    use crate::config::RouteConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GateConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GateConfig::default();
        config.gate.login_url = String::new();
        config.gate.subscription_redirect = " ".to_string();
        config.gate.exempt_urls = vec!["".into(), "fn:".into(), "home".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyLoginUrl));
        assert!(errors.contains(&ValidationError::EmptyExemptRule(0)));
    }

    #[test]
    fn test_duplicate_routes() {
        let mut config = GateConfig::default();
        let route = RouteConfig {
            path: "/p/".into(),
            name: Some("detail".into()),
            namespace: Some("products".into()),
            app_name: None,
        };
        config.routes = vec![route.clone(), route];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateRoute("products:detail".into())]
        );
    }
}
