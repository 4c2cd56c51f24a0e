//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the view handler
//! - Wire up middleware (tracing, timeout, subscription gate)
//! - Bind server to listener
//! - Shut down gracefully on Ctrl+C

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::billing::{SubscriberResolver, SubscriptionStatus};
use crate::config::GateConfig;
use crate::routing::{RouteTable, UrlResolver};
use crate::security::access_control::{
    subscription_required_middleware, AccessControlState, GateSetupError, SubscriptionGate,
};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<dyn UrlResolver>,
}

/// HTTP server fronting the gated views.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and collaborators.
    pub fn new(
        config: GateConfig,
        subscribers: Arc<dyn SubscriberResolver>,
        status: Arc<dyn SubscriptionStatus>,
    ) -> Result<Self, GateSetupError> {
        let resolver: Arc<dyn UrlResolver> = Arc::new(RouteTable::from_config(&config.routes));
        let access = AccessControlState::new(
            &config.gate,
            resolver.clone(),
            SubscriptionGate::new(subscribers, status),
        )?;

        let router = Self::build_router(&config, AppState { resolver }, access);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GateConfig, state: AppState, access: AccessControlState) -> Router {
        Router::new()
            .fallback(view_handler)
            .with_state(state)
            .layer(from_fn_with_state(access, subscription_required_middleware))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.listener.request_timeout_secs),
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Echoes the route the request resolved to.
async fn view_handler(State(state): State<AppState>, uri: Uri) -> Response {
    match state.resolver.resolve(uri.path()) {
        Ok(route) => Json(route).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::{HeaderSubscriberResolver, SubscriptionCache};
    use crate::config::RouteConfig;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let mut config = GateConfig::default();
        config.gate.subscription_redirect = "/pricing/".into();
        config.routes = vec![RouteConfig {
            path: "/reports/*".into(),
            name: Some("report".into()),
            namespace: Some("reports".into()),
            app_name: Some("analytics".into()),
        }];

        let cache = SubscriptionCache::new(None, 0);
        cache.update_subscription("paid", "pro", 9_999_999_999);
        HttpServer::new(
            config,
            Arc::new(HeaderSubscriberResolver::new("x-subscriber-id", Vec::new())),
            Arc::new(cache),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_view_receives_resolved_route() {
        let res = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/reports/q3/")
                    .header("x-subscriber-id", "paid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["app_name"], "analytics");
        assert_eq!(json["namespace"], "reports");
        assert_eq!(json["url_name"], "report");
    }

    #[tokio::test]
    async fn test_unsubscribed_is_redirected() {
        let res = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/reports/q3/")
                    .header("x-subscriber-id", "free")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers()["location"], "/pricing/");
    }
}
