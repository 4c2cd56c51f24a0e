//! Redirect responses issued by the gate.
//!
//! # Responsibilities
//! - Turn a redirect setting into a concrete URL
//! - Build login URLs that carry the return path verbatim
//! - Produce `302 Found` responses
//!
//! # Design Decisions
//! - Settings that look like URLs (contain `/` or `.`) are used verbatim
//! - Anything else must name a route; unknown names fail at startup

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::routing::UrlResolver;

/// Characters that would end or split a query value. `/` stays readable.
const NEXT_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>');

/// Resolve a redirect setting to a URL.
///
/// Returns `None` when the setting names a route the resolver does not know.
pub fn resolve_redirect_url(resolver: &dyn UrlResolver, target: &str) -> Option<String> {
    if let Some(path) = resolver.reverse(target) {
        return Some(path);
    }
    if target.contains('/') || target.contains('.') {
        return Some(target.to_string());
    }
    None
}

/// Append `next=<path>` to the login URL.
///
/// The path is kept as is; only characters that would end or split the
/// query value are escaped.
pub fn login_redirect_url(login_url: &str, next: &str) -> String {
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!("{login_url}{separator}next={}", utf8_percent_encode(next, NEXT_VALUE))
}

/// A `302 Found` pointing at `location`.
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;
    use crate::routing::RouteTable;

    #[test]
    fn test_resolve_redirect_url() {
        let table = RouteTable::from_config(&[RouteConfig {
            path: "/subscription/subscribe/".into(),
            name: Some("subscribe".into()),
            namespace: Some("subscription_gate".into()),
            app_name: Some("subscription_gate".into()),
        }]);

        assert_eq!(
            resolve_redirect_url(&table, "subscription_gate:subscribe").as_deref(),
            Some("/subscription/subscribe/")
        );
        assert_eq!(resolve_redirect_url(&table, "/pricing/").as_deref(), Some("/pricing/"));
        assert_eq!(
            resolve_redirect_url(&table, "https://example.com").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(resolve_redirect_url(&table, "subscription_gate:missing"), None);
    }

    #[test]
    fn test_login_redirect_url() {
        assert_eq!(
            login_redirect_url("/accounts/login/", "/reports/q1/"),
            "/accounts/login/?next=/reports/q1/"
        );
        assert_eq!(
            login_redirect_url("/login?source=gate", "/a b"),
            "/login?source=gate&next=/a%20b"
        );
        assert_eq!(
            login_redirect_url("/login/", "/r&d/50%#top+1"),
            "/login/?next=/r%26d/50%25%23top%2B1"
        );
    }

    #[test]
    fn test_redirect_response() {
        let res = redirect("/subscription/subscribe/");
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers()[header::LOCATION], "/subscription/subscribe/");
    }
}
