//! URL resolution and reversal.
//!
//! # Responsibilities
//! - Resolve a request path to its (app, namespace, name) triple
//! - Reverse a route identifier back into a path
//! - Return an explicit not-found error for unknown paths
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins, in declaration order
//! - Only exact routes can be reversed

use serde::Serialize;
use thiserror::Error;

use crate::config::RouteConfig;
use crate::routing::matcher::{route_path_matcher, PathMatcher};

/// The routing layer's answer for a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    pub app_name: Option<String>,
    pub namespace: Option<String>,
    pub url_name: Option<String>,
}

/// Errors raised by URL resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no route matches path '{0}'")]
    NotFound(String),
}

/// The routing collaborator used by the gate.
pub trait UrlResolver: Send + Sync {
    /// Resolve a raw request path.
    fn resolve(&self, path: &str) -> Result<ResolvedRoute, ResolveError>;

    /// Path for a route identifier (`name` or `namespace:name`).
    fn reverse(&self, identifier: &str) -> Option<String>;
}

#[derive(Debug)]
struct CompiledRoute {
    pattern: String,
    matcher: Box<dyn PathMatcher>,
    route: ResolvedRoute,
}

impl CompiledRoute {
    fn identifier(&self) -> Option<String> {
        let name = self.route.url_name.as_deref()?;
        Some(match self.route.namespace.as_deref() {
            Some(ns) => format!("{ns}:{name}"),
            None => name.to_string(),
        })
    }
}

/// Route table compiled from configuration.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    pub fn from_config(routes: &[RouteConfig]) -> Self {
        let routes = routes
            .iter()
            .map(|r| CompiledRoute {
                pattern: r.path.clone(),
                matcher: route_path_matcher(&r.path),
                route: ResolvedRoute {
                    app_name: r.app_name.clone(),
                    namespace: r.namespace.clone(),
                    url_name: r.name.clone(),
                },
            })
            .collect::<Vec<_>>();

        tracing::debug!(route_count = routes.len(), "Route table compiled");
        Self { routes }
    }
}

impl UrlResolver for RouteTable {
    fn resolve(&self, path: &str) -> Result<ResolvedRoute, ResolveError> {
        self.routes
            .iter()
            .find(|r| r.matcher.matches(path))
            .map(|r| r.route.clone())
            .ok_or_else(|| ResolveError::NotFound(path.to_string()))
    }

    fn reverse(&self, identifier: &str) -> Option<String> {
        self.routes
            .iter()
            .filter(|r| !r.pattern.ends_with('*'))
            .find(|r| r.identifier().as_deref() == Some(identifier))
            .map(|r| r.pattern.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str, app: Option<&str>, ns: Option<&str>, name: Option<&str>) -> RouteConfig {
        RouteConfig {
            path: path.to_string(),
            name: name.map(String::from),
            namespace: ns.map(String::from),
            app_name: app.map(String::from),
        }
    }

    fn table() -> RouteTable {
        RouteTable::from_config(&[
            route("/", None, None, Some("home")),
            route("/subscription/subscribe/", Some("subscription_gate"), Some("subscription_gate"), Some("subscribe")),
            route("/products/*", None, Some("products"), Some("detail")),
            route("/*", None, None, None),
        ])
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let t = table();
        let r = t.resolve("/products/42/").unwrap();
        assert_eq!(r.namespace.as_deref(), Some("products"));
        assert_eq!(r.url_name.as_deref(), Some("detail"));

        let catch_all = t.resolve("/anything").unwrap();
        assert_eq!(catch_all, ResolvedRoute::default());
    }

    #[test]
    fn test_resolve_not_found() {
        let t = RouteTable::from_config(&[route("/", None, None, Some("home"))]);
        assert_eq!(
            t.resolve("/missing"),
            Err(ResolveError::NotFound("/missing".to_string()))
        );
    }

    #[test]
    fn test_reverse() {
        let t = table();
        assert_eq!(
            t.reverse("subscription_gate:subscribe").as_deref(),
            Some("/subscription/subscribe/")
        );
        assert_eq!(t.reverse("home").as_deref(), Some("/"));
        // Prefix routes have no single path
        assert_eq!(t.reverse("products:detail"), None);
        assert_eq!(t.reverse("subscribe"), None);
    }
}
