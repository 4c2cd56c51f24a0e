//! Subscriber identification.

use std::collections::HashSet;

use axum::{body::Body, http::Request};

use crate::billing::BillingError;
use crate::config::SubscriberConfig;

/// The entity whose billing status gates access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscriber {
    /// No authenticated identity on the request.
    Anonymous,
    /// An authenticated account.
    Account { id: String, is_staff: bool },
}

/// Derives the subscriber from an incoming request.
pub trait SubscriberResolver: Send + Sync {
    fn resolve_subscriber(&self, req: &Request<Body>) -> Result<Subscriber, BillingError>;
}

/// Reads the subscriber id from a request header set by the auth layer.
#[derive(Debug, Clone)]
pub struct HeaderSubscriberResolver {
    header: String,
    staff: HashSet<String>,
}

impl HeaderSubscriberResolver {
    pub fn new(header: impl Into<String>, staff: impl IntoIterator<Item = String>) -> Self {
        Self {
            header: header.into(),
            staff: staff.into_iter().collect(),
        }
    }
}

impl SubscriberResolver for HeaderSubscriberResolver {
    fn resolve_subscriber(&self, req: &Request<Body>) -> Result<Subscriber, BillingError> {
        let id = req
            .headers()
            .get(self.header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        Ok(match id {
            Some(id) => Subscriber::Account {
                id: id.to_string(),
                is_staff: self.staff.contains(id),
            },
            None => Subscriber::Anonymous,
        })
    }
}

/// Stand-in used when the application never wired up subscriber resolution.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredSubscriberResolver;

impl SubscriberResolver for UnconfiguredSubscriberResolver {
    fn resolve_subscriber(&self, _req: &Request<Body>) -> Result<Subscriber, BillingError> {
        Err(BillingError::NotConfigured(
            "no subscriber resolver has been configured".to_string(),
        ))
    }
}

/// Pick the resolver matching the subscriber configuration.
pub fn resolver_from_config(config: &SubscriberConfig) -> Box<dyn SubscriberResolver> {
    if config.enabled {
        Box::new(HeaderSubscriberResolver::new(
            config.header.clone(),
            config.staff.iter().cloned(),
        ))
    } else {
        tracing::warn!("Subscriber resolution disabled; every gated request will be sent to login");
        Box::new(UnconfiguredSubscriberResolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/dashboard/");
        if let Some(v) = header {
            builder = builder.header("x-subscriber-id", v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_header_resolver() {
        let resolver = HeaderSubscriberResolver::new("x-subscriber-id", vec!["root".to_string()]);

        assert_eq!(
            resolver.resolve_subscriber(&request(Some("cus_1"))).unwrap(),
            Subscriber::Account {
                id: "cus_1".into(),
                is_staff: false
            }
        );
        assert_eq!(
            resolver.resolve_subscriber(&request(Some("root"))).unwrap(),
            Subscriber::Account {
                id: "root".into(),
                is_staff: true
            }
        );
        assert_eq!(
            resolver.resolve_subscriber(&request(None)).unwrap(),
            Subscriber::Anonymous
        );
        assert_eq!(
            resolver.resolve_subscriber(&request(Some("  "))).unwrap(),
            Subscriber::Anonymous
        );
    }

    #[test]
    fn test_unconfigured_resolver() {
        let err = UnconfiguredSubscriberResolver
            .resolve_subscriber(&request(Some("cus_1")))
            .unwrap_err();
        assert!(matches!(err, BillingError::NotConfigured(_)));
    }

    #[test]
    fn test_resolver_from_config() {
        let mut config = SubscriberConfig::default();
        config.enabled = false;
        let resolver = resolver_from_config(&config);
        assert!(resolver.resolve_subscriber(&request(Some("cus_1"))).is_err());
    }
}
