//! Subscription gate middleware library.
//!
//! Gates views behind an active subscription, with a rule list for routes
//! that bypass the check.

pub mod billing;
pub mod config;
pub mod http;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::GateConfig;
pub use http::HttpServer;
pub use security::{GateDecision, SubscriptionGate};
