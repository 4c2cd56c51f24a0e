//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use subscription_gate::billing::{HeaderSubscriberResolver, SubscriberResolver, SubscriptionCache};
use subscription_gate::config::{GateConfig, RouteConfig};
use subscription_gate::HttpServer;
use tokio::net::TcpListener;

pub fn route(path: &str, app: Option<&str>, namespace: Option<&str>, name: &str) -> RouteConfig {
    RouteConfig {
        path: path.to_string(),
        name: Some(name.to_string()),
        namespace: namespace.map(String::from),
        app_name: app.map(String::from),
    }
}

/// Route table shared by the integration tests.
pub fn site_routes() -> Vec<RouteConfig> {
    vec![
        route("/", None, None, "home"),
        route("/accounts/login/", None, Some("accounts"), "login"),
        route("/accounts/*", None, Some("accounts"), "profile"),
        route("/blog/*", Some("blogs"), Some("posts"), "post"),
        route("/products/*", None, Some("products"), "detail"),
        route("/subscription/subscribe/", Some("subscription_gate"), Some("subscription_gate"), "subscribe"),
        route("/subscription/*", Some("subscription_gate"), Some("subscription_gate"), "plans"),
        route("/billing/*", None, Some("billing"), "detail"),
        route("/reports/*", None, Some("reports"), "detail"),
    ]
}

/// Subscription cache with one paying and one lapsed subscriber.
pub fn seeded_cache() -> SubscriptionCache {
    let cache = SubscriptionCache::new(None, 0);
    cache.update_subscription("cus_paid", "pro", 9_999_999_999);
    cache.update_subscription("cus_lapsed", "pro", 1);
    cache
}

pub fn header_resolver() -> Arc<dyn SubscriberResolver> {
    Arc::new(HeaderSubscriberResolver::new("x-subscriber-id", Vec::new()))
}

/// Start the server on an ephemeral port and return its address.
pub async fn start_server(config: GateConfig, subscribers: Arc<dyn SubscriberResolver>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, subscribers, Arc::new(seeded_cache())).unwrap();

    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
