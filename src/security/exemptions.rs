//! Exemption rules for the subscription gate.
//!
//! Rules, checked in this order (first match wins):
//!
//! - In debug mode, anything under [`DEBUG_TOOLBAR_PREFIX`] is exempt
//! - `(app_name)` exempts everything from that app
//! - `[namespace]` exempts everything in that namespace
//! - `namespace:name` exempts that namespaced route
//! - `name` exempts that route
//! - `fn:<glob>` exempts raw paths matching the glob
//!
//! The gate's own namespace ([`GATE_NAMESPACE`]) is always exempt. A route component the resolver
//! left undefined is formatted as `None`, so `[None]` matches routes
//! without a namespace.

use std::collections::HashSet;
use std::sync::Arc;

use crate::routing::{GlobError, GlobMatcher, PathMatcher, ResolveError, ResolvedRoute, UrlResolver};

/// Paths served by the debug toolbar.
pub const DEBUG_TOOLBAR_PREFIX: &str = "/__debug__";

/// Namespace of the gate's own views (subscribe flow).
pub const GATE_NAMESPACE: &str = "subscription_gate";

/// Marks a rule as a path glob.
pub const GLOB_PREFIX: &str = "fn:";

/// Ordered, immutable set of exemption rules.
#[derive(Debug, Clone)]
pub struct ExemptionList {
    rules: Vec<String>,
    lookup: HashSet<String>,
    globs: Vec<GlobMatcher>,
}

impl ExemptionList {
    /// Build the list from configured rules plus the gate's own namespace.
    pub fn new<I, S>(rules: I) -> Result<Self, GlobError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rules: Vec<String> = rules.into_iter().map(Into::into).collect();
        rules.push(format!("[{GATE_NAMESPACE}]"));

        let globs = rules
            .iter()
            .filter_map(|r| r.strip_prefix(GLOB_PREFIX))
            .map(GlobMatcher::new)
            .collect::<Result<Vec<_>, _>>()?;
        let lookup = rules.iter().cloned().collect();

        Ok(Self {
            rules,
            lookup,
            globs,
        })
    }

    /// All rules, including the gate namespace sentinel, in order.
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    fn contains(&self, rule: &str) -> bool {
        self.lookup.contains(rule)
    }

    /// The first rule that exempts the request, if any.
    pub fn matching_rule(&self, debug: bool, path: &str, route: &ResolvedRoute) -> Option<String> {
        if let Some(rule) = debug_toolbar_rule(debug, path) {
            return Some(rule);
        }

        let app_name = or_none(&route.app_name);
        let namespace = or_none(&route.namespace);

        let candidates = [
            Some(format!("({app_name})")),
            Some(format!("[{namespace}]")),
            Some(format!("{namespace}:{}", or_none(&route.url_name))),
            route.url_name.clone(),
        ];
        if let Some(rule) = candidates.into_iter().flatten().find(|c| self.contains(c)) {
            return Some(rule);
        }

        self.globs
            .iter()
            .find(|g| g.matches(path))
            .map(|g| format!("{GLOB_PREFIX}{}", g.pattern()))
    }
}

/// Rule 1: debug toolbar paths, decided from the raw path alone.
fn debug_toolbar_rule(debug: bool, path: &str) -> Option<String> {
    (debug && path.starts_with(DEBUG_TOOLBAR_PREFIX)).then(|| DEBUG_TOOLBAR_PREFIX.to_string())
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

/// Everything needed to decide exemption for a raw request path.
#[derive(Clone)]
pub struct ExemptionPolicy {
    debug: bool,
    exemptions: Arc<ExemptionList>,
    resolver: Arc<dyn UrlResolver>,
}

impl ExemptionPolicy {
    pub fn new(debug: bool, exemptions: ExemptionList, resolver: Arc<dyn UrlResolver>) -> Self {
        Self {
            debug,
            exemptions: Arc::new(exemptions),
            resolver,
        }
    }

    /// Whether enforcement is skipped for `path`.
    ///
    /// Resolution failures are returned to the caller untouched.
    /// Debug toolbar paths are exempt without being resolved.
    pub fn check(&self, path: &str) -> Result<bool, ResolveError> {
        let rule = match debug_toolbar_rule(self.debug, path) {
            Some(rule) => Some(rule),
            None => {
                let route = self.resolver.resolve(path)?;
                self.exemptions.matching_rule(self.debug, path, &route)
            }
        };

        match rule {
            Some(rule) => {
                tracing::debug!(path = %path, rule = %rule, "Path exempt from subscription check");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
