use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// A named group of routes sharing one rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EndpointClass {
    Landing,
    Metadata,
    Random,
    Listing,
    Search,
    Health,
}

impl EndpointClass {
    pub const ALL: [EndpointClass; 6] = [
        EndpointClass::Landing,
        EndpointClass::Metadata,
        EndpointClass::Random,
        EndpointClass::Listing,
        EndpointClass::Search,
        EndpointClass::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointClass::Landing => "landing",
            EndpointClass::Metadata => "metadata",
            EndpointClass::Random => "random",
            EndpointClass::Listing => "listing",
            EndpointClass::Search => "search",
            EndpointClass::Health => "health",
        }
    }

    /// Map a matched route template to its class.
    pub fn for_route(route: &str) -> Option<Self> {
        match route {
            "/" => Some(EndpointClass::Landing),
            "/info" | "/wisdom/categories" | "/wisdom/authors" | "/wisdom/sources" => {
                Some(EndpointClass::Metadata)
            }
            "/wisdom/random" | "/wisdom/:id" => Some(EndpointClass::Random),
            "/wisdom" => Some(EndpointClass::Listing),
            "/wisdom/search" => Some(EndpointClass::Search),
            "/health" => Some(EndpointClass::Health),
            _ => None,
        }
    }

    /// Requests allowed per window by default.
    pub fn default_limit(&self) -> u32 {
        match self {
            EndpointClass::Random => 30,
            EndpointClass::Listing => 20,
            EndpointClass::Search => 15,
            EndpointClass::Metadata => 10,
            EndpointClass::Health => 5,
            EndpointClass::Landing => 30,
        }
    }
}

impl fmt::Display for EndpointClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for rate limiting rules
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub window: Duration,
    pub rules: BTreeMap<EndpointClass, u32>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window: DEFAULT_WINDOW,
            rules: EndpointClass::ALL
                .iter()
                .map(|class| (*class, class.default_limit()))
                .collect(),
        }
    }
}

impl RateLimitConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn limit_for(&self, class: EndpointClass) -> u32 {
        self.rules
            .get(&class)
            .copied()
            .unwrap_or_else(|| class.default_limit())
    }

    /// Human-readable limits, e.g. `{"search": "15/minute"}`.
    pub fn describe(&self) -> BTreeMap<&'static str, String> {
        let unit = window_unit(self.window);
        EndpointClass::ALL
            .iter()
            .map(|class| (class.as_str(), format!("{}/{}", self.limit_for(*class), unit)))
            .collect()
    }
}

/// Short unit for a window length: `minute` for 60 s, otherwise e.g. `30s`.
pub fn window_unit(window: Duration) -> String {
    match window.as_secs() {
        60 => "minute".to_string(),
        secs => format!("{}s", secs),
    }
}

/// Spelled-out window length, e.g. `1 minute` or `30 seconds`.
pub fn window_phrase(window: Duration) -> String {
    match window.as_secs() {
        1 => "1 second".to_string(),
        60 => "1 minute".to_string(),
        secs if secs % 60 == 0 => format!("{} minutes", secs / 60),
        secs => format!("{} seconds", secs),
    }
}
