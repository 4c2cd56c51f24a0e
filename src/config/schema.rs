//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the subscription gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Subscription enforcement settings.
    pub gate: SubscriptionGateConfig,

    /// Route table handed to the URL resolver.
    pub routes: Vec<RouteConfig>,

    /// How subscribers are identified on incoming requests.
    pub subscriber: SubscriberConfig,

    /// Subscription store settings.
    pub subscriptions: SubscriptionStoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Subscription enforcement settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubscriptionGateConfig {
    /// Debug mode. Exempts the debug toolbar prefix.
    pub debug: bool,

    /// Where unauthenticated subscribers are sent. `next` is appended.
    pub login_url: String,

    /// Route identifier (or literal URL) for the subscribe flow.
    pub subscription_redirect: String,

    /// Exemption rules, evaluated in order.
    ///
    /// - `(app_name)` exempts a whole app
    /// - `[namespace]` exempts a namespace
    /// - `namespace:name` exempts one namespaced route
    /// - `name` exempts one route
    /// - `fn:<glob>` exempts raw paths matching the glob
    pub exempt_urls: Vec<String>,
}

impl Default for SubscriptionGateConfig {
    fn default() -> Self {
        Self {
            debug: false,
            login_url: "/accounts/login/".to_string(),
            subscription_redirect: "subscription_gate:subscribe".to_string(),
            exempt_urls: Vec::new(),
        }
    }
}

/// A single route known to the URL resolver.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Exact path, or a prefix when it ends in `*`.
    pub path: String,

    /// Route name (e.g., "detail").
    #[serde(default)]
    pub name: Option<String>,

    /// Namespace the route is mounted under.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Application the route belongs to.
    #[serde(default)]
    pub app_name: Option<String>,
}

/// Subscriber identification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubscriberConfig {
    /// When false, subscriber resolution is treated as not configured.
    pub enabled: bool,

    /// Header carrying the authenticated subscriber id.
    pub header: String,

    /// Subscriber ids that always count as subscribed.
    pub staff: Vec<String>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            header: "x-subscriber-id".to_string(),
            staff: Vec::new(),
        }
    }
}

/// Subscription store settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SubscriptionStoreConfig {
    /// JSON snapshot loaded at startup and written on shutdown.
    pub persistence_path: Option<String>,

    /// Grace period for expired subscriptions in seconds.
    pub grace_period_secs: u64,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GateConfig = toml::from_str("").unwrap();
        assert_eq!(config.gate.login_url, "/accounts/login/");
        assert_eq!(config.gate.subscription_redirect, "subscription_gate:subscribe");
        assert!(config.gate.exempt_urls.is_empty());
        assert!(!config.gate.debug);
        assert_eq!(config.subscriber.header, "x-subscriber-id");
    }

    #[test]
    fn test_parse_full_config() {
        let raw = r#"
            [gate]
            debug = true
            subscription_redirect = "/pricing/"
            exempt_urls = ["(blogs)", "products:detail", "home", "fn:/accounts*"]

            [[routes]]
            path = "/products/*"
            name = "detail"
            namespace = "products"

            [observability]
            log_format = "json"
        "#;
        let config: GateConfig = toml::from_str(raw).unwrap();
        assert!(config.gate.debug);
        assert_eq!(config.gate.exempt_urls.len(), 4);
        assert_eq!(config.routes[0].namespace.as_deref(), Some("products"));
        assert_eq!(config.routes[0].app_name, None);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
