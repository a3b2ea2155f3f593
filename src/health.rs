use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::rate_limit_config::RateLimitConfig;
use crate::store::RecordStore;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub api_version: String,
    pub total_wisdom: usize,
    pub available_categories: usize,
    pub available_authors: usize,
    pub uptime_seconds: u64,
    pub rate_limits: BTreeMap<&'static str, String>,
}

pub struct HealthChecker {
    started: Instant,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn check_health(&self, store: &RecordStore, limits: &RateLimitConfig) -> HealthStatus {
        // an empty collection is still serviceable, just not useful
        let status = if store.is_empty() { "degraded" } else { "healthy" };

        HealthStatus {
            status: status.to_string(),
            api_version: env!("CARGO_PKG_VERSION").to_string(),
            total_wisdom: store.count(),
            available_categories: store.categories().len(),
            available_authors: store.authors().len(),
            uptime_seconds: self.started.elapsed().as_secs(),
            rate_limits: limits.describe(),
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}
