//! Subscription caching and persistence.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::billing::{BillingError, Subscriber, SubscriptionStatus};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Information about a subscriber's subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    /// The plan subscribed to.
    pub plan: String,
    /// Expiry timestamp (seconds since epoch).
    pub expiry: u64,
}

impl SubscriptionInfo {
    /// Check if the subscription is active.
    pub fn is_active(&self) -> bool {
        self.expiry > now_secs()
    }

    /// Check if active or within grace period.
    pub fn is_active_with_grace(&self, grace_secs: u64) -> bool {
        self.expiry.saturating_add(grace_secs) > now_secs()
    }
}

/// A thread-safe cache of subscriptions keyed by subscriber id.
#[derive(Clone, Default)]
pub struct SubscriptionCache {
    inner: Arc<DashMap<String, SubscriptionInfo>>,
    persistence_path: Option<String>,
    grace_period_secs: u64,
}

impl SubscriptionCache {
    /// Create a new empty cache.
    pub fn new(persistence_path: Option<String>, grace_period_secs: u64) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
            grace_period_secs,
        }
    }

    /// Load from file if it exists.
    pub fn load_from_file(path: &str, grace_period_secs: u64) -> std::io::Result<Self> {
        let cache = Self::new(Some(path.to_string()), grace_period_secs);
        if Path::new(path).exists() {
            let reader = BufReader::new(File::open(path)?);
            let map: HashMap<String, SubscriptionInfo> = serde_json::from_reader(reader)?;
            for (k, v) in map {
                cache.inner.insert(k, v);
            }
            tracing::info!(count = cache.inner.len(), path = %path, "Loaded subscriptions from cache file");
        }
        Ok(cache)
    }

    /// Save to the persistence file, if one is configured.
    pub fn save_to_file(&self) -> std::io::Result<()> {
        if let Some(path) = &self.persistence_path {
            let writer = BufWriter::new(File::create(path)?);
            let map: HashMap<_, _> = self
                .inner
                .iter()
                .map(|r| (r.key().clone(), r.value().clone()))
                .collect();

            serde_json::to_writer(writer, &map)?;
            tracing::info!(count = map.len(), path = %path, "Saved subscriptions to cache file");
        }
        Ok(())
    }

    /// Record or replace a subscription.
    pub fn update_subscription(&self, subscriber_id: impl Into<String>, plan: impl Into<String>, expiry: u64) {
        self.inner.insert(
            subscriber_id.into(),
            SubscriptionInfo {
                plan: plan.into(),
                expiry,
            },
        );
    }

    pub fn get_subscription(&self, subscriber_id: &str) -> Option<SubscriptionInfo> {
        self.inner.get(subscriber_id).map(|r| r.value().clone())
    }
}

impl SubscriptionStatus for SubscriptionCache {
    fn has_active_subscription(&self, subscriber: &Subscriber) -> Result<bool, BillingError> {
        match subscriber {
            Subscriber::Anonymous => Err(BillingError::NotConfigured(
                "the subscriber resolved to an anonymous identity; \
                 subscription checks need an authenticated subscriber"
                    .to_string(),
            )),
            Subscriber::Account { is_staff: true, .. } => Ok(true),
            Subscriber::Account { id, .. } => Ok(self
                .get_subscription(id)
                .is_some_and(|s| s.is_active_with_grace(self.grace_period_secs))),
        }
    }
}
