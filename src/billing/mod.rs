//! Billing collaborators consumed by the subscription gate.
//!
//! The gate only needs two answers: who is asking, and whether they are
//! subscribed. Both come through the traits defined here.

pub mod cache;
pub mod subscriber;

use thiserror::Error;

pub use cache::{SubscriptionCache, SubscriptionInfo};
pub use subscriber::{
    resolver_from_config, HeaderSubscriberResolver, Subscriber, SubscriberResolver,
    UnconfiguredSubscriberResolver,
};

/// Errors raised by billing collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BillingError {
    /// Subscriber resolution is missing or cannot work for this request.
    #[error("billing not configured: {0}")]
    NotConfigured(String),

    /// The billing backend failed.
    #[error("billing backend error: {0}")]
    Backend(String),
}

/// Answers whether a subscriber currently holds an active subscription.
pub trait SubscriptionStatus: Send + Sync {
    fn has_active_subscription(&self, subscriber: &Subscriber) -> Result<bool, BillingError>;
}
