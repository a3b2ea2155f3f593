use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::{Result, WisdomError};
use crate::rate_limit_config::{EndpointClass, RateLimitConfig};

/// Source of the current time for window accounting.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Outcome of an admitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Windows are counted per client and route; the limit comes from the route's class.
type WindowKey = (String, String);

/// Fixed-window limiter keyed by client and route.
#[derive(Clone)]
pub struct RateLimiter {
    config: Arc<RateLimitConfig>,
    clock: Arc<dyn Clock>,
    windows: Arc<Mutex<HashMap<WindowKey, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: Arc::new(config),
            clock,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request against the client's window for `route`, limited by `class`.
    ///
    /// The window check, reset and increment happen under one lock, so
    /// concurrent requests cannot both take the last slot.
    pub fn check(
        &self,
        client_key: &str,
        route: &str,
        class: EndpointClass,
    ) -> Result<RateLimitStatus> {
        let limit = self.config.limit_for(class);
        if !self.config.enabled {
            return Ok(RateLimitStatus { limit, remaining: limit });
        }

        let now = self.clock.now();
        let window_len = self.config.window;

        let mut windows = self.windows.lock()
            .map_err(|_| WisdomError::Internal("Failed to acquire lock on rate limit windows".to_string()))?;

        let window = windows
            .entry((client_key.to_string(), route.to_string()))
            .or_insert(Window { started: now, count: 0 });

        if now.saturating_duration_since(window.started) >= window_len {
            window.started = now;
            window.count = 0;
        }

        window.count = window.count.saturating_add(1);

        if window.count <= limit {
            Ok(RateLimitStatus {
                limit,
                remaining: limit - window.count,
            })
        } else {
            Err(WisdomError::RateLimited {
                limit,
                retry_after_secs: window_len.as_secs(),
            })
        }
    }

    /// Drop windows that have fully elapsed. Returns how many were removed.
    pub fn cleanup_expired_windows(&self) -> Result<usize> {
        let now = self.clock.now();
        let window_len = self.config.window;

        let mut windows = self.windows.lock()
            .map_err(|_| WisdomError::Internal("Failed to acquire lock on rate limit windows".to_string()))?;

        let initial_count = windows.len();
        windows.retain(|_, window| now.saturating_duration_since(window.started) < window_len);

        Ok(initial_count - windows.len())
    }

    pub fn tracked_windows(&self) -> Result<usize> {
        let windows = self.windows.lock()
            .map_err(|_| WisdomError::Internal("Failed to acquire lock on rate limit windows".to_string()))?;
        Ok(windows.len())
    }
}
