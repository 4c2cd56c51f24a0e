//! Access Control Middleware.
//! Enforces subscription requirements on non-exempt routes.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::billing::{BillingError, SubscriberResolver, SubscriptionStatus};
use crate::config::SubscriptionGateConfig;
use crate::http::response::{login_redirect_url, redirect, resolve_redirect_url};
use crate::observability::metrics;
use crate::routing::{GlobError, UrlResolver};
use crate::security::exemptions::{ExemptionList, ExemptionPolicy};

/// Outcome of checking a non-exempt request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The subscriber has an active subscription.
    Allowed,
    /// The subscriber has no active subscription.
    SubscriptionRequired,
    /// Subscriber resolution is not configured for this request.
    ResolverMisconfigured,
}

/// Checks subscription status through the injected collaborators.
pub struct SubscriptionGate {
    subscribers: Arc<dyn SubscriberResolver>,
    status: Arc<dyn SubscriptionStatus>,
}

impl SubscriptionGate {
    pub fn new(subscribers: Arc<dyn SubscriberResolver>, status: Arc<dyn SubscriptionStatus>) -> Self {
        Self {
            subscribers,
            status,
        }
    }

    /// Decide whether `req` may proceed.
    ///
    /// `NotConfigured` failures become [`GateDecision::ResolverMisconfigured`];
    /// any other billing error is returned as is.
    pub fn check(&self, req: &Request<Body>) -> Result<GateDecision, BillingError> {
        let subscribed = self
            .subscribers
            .resolve_subscriber(req)
            .and_then(|subscriber| self.status.has_active_subscription(&subscriber));

        match subscribed {
            Ok(true) => Ok(GateDecision::Allowed),
            Ok(false) => Ok(GateDecision::SubscriptionRequired),
            Err(BillingError::NotConfigured(reason)) => {
                warn!(path = %req.uri().path(), reason = %reason, "Subscriber resolution not configured");
                Ok(GateDecision::ResolverMisconfigured)
            }
            Err(e) => Err(e),
        }
    }
}

/// Errors raised while assembling the middleware state.
#[derive(Debug, Error)]
pub enum GateSetupError {
    #[error("{setting} '{target}' is neither a URL nor a known route")]
    UnknownRedirect { setting: &'static str, target: String },

    #[error("{setting} '{target}' cannot be sent as a Location header")]
    InvalidRedirect { setting: &'static str, target: String },

    #[error(transparent)]
    InvalidExemption(#[from] GlobError),
}

/// State required for access control.
#[derive(Clone)]
pub struct AccessControlState {
    policy: ExemptionPolicy,
    gate: Arc<SubscriptionGate>,
    subscribe_url: String,
    login_url: String,
}

impl AccessControlState {
    /// Build the state once at startup. Redirect targets are resolved here.
    pub fn new(
        config: &SubscriptionGateConfig,
        resolver: Arc<dyn UrlResolver>,
        gate: SubscriptionGate,
    ) -> Result<Self, GateSetupError> {
        let subscribe_url = redirect_setting(
            resolver.as_ref(),
            "subscription_redirect",
            &config.subscription_redirect,
        )?;
        let login_url = redirect_setting(resolver.as_ref(), "login_url", &config.login_url)?;

        let exemptions = ExemptionList::new(config.exempt_urls.iter().cloned())?;
        tracing::info!(
            rules = ?exemptions.rules(),
            debug = config.debug,
            subscribe_url = %subscribe_url,
            "Subscription gate configured"
        );

        Ok(Self {
            policy: ExemptionPolicy::new(config.debug, exemptions, resolver),
            gate: Arc::new(gate),
            subscribe_url,
            login_url,
        })
    }
}

/// Resolve a redirect setting and make sure it can be a `Location` value.
fn redirect_setting(
    resolver: &dyn UrlResolver,
    setting: &'static str,
    target: &str,
) -> Result<String, GateSetupError> {
    let url = resolve_redirect_url(resolver, target).ok_or_else(|| GateSetupError::UnknownRedirect {
        setting,
        target: target.to_string(),
    })?;
    HeaderValue::try_from(url.as_str()).map_err(|_| GateSetupError::InvalidRedirect {
        setting,
        target: target.to_string(),
    })?;
    Ok(url)
}

pub async fn subscription_required_middleware(
    State(state): State<AccessControlState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    // 1. Exempt routes skip the check entirely.
    match state.policy.check(&path) {
        Ok(true) => {
            metrics::record_decision("exempt");
            return next.run(req).await;
        }
        Ok(false) => {}
        Err(e) => {
            metrics::record_decision("route_not_found");
            warn!(path = %path, error = %e, "Request path did not resolve");
            return (StatusCode::NOT_FOUND, e.to_string()).into_response();
        }
    }

    // 2. Check the subscriber.
    match state.gate.check(&req) {
        Ok(GateDecision::Allowed) => {
            metrics::record_decision("allowed");
            next.run(req).await
        }
        Ok(GateDecision::SubscriptionRequired) => {
            metrics::record_decision("subscription_required");
            info!(path = %path, location = %state.subscribe_url, "No active subscription, redirecting");
            redirect(&state.subscribe_url)
        }
        Ok(GateDecision::ResolverMisconfigured) => {
            metrics::record_decision("resolver_misconfigured");
            let location = login_redirect_url(&state.login_url, &path);
            info!(path = %path, location = %location, "Redirecting to login");
            redirect(&location)
        }
        Err(e) => {
            metrics::record_decision("backend_error");
            tracing::error!(path = %path, error = %e, "Subscription check failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Subscription check failed").into_response()
        }
    }
}
