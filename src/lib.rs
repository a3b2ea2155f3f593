pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod query;
pub mod rate_limit_config;
pub mod rate_limiter;
pub mod response;
pub mod server;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::{Result, WisdomError};
pub use query::{ListFilters, Page, QueryEngine};
pub use rate_limiter::RateLimiter;
pub use server::create_app;
pub use store::{RecordStore, WisdomRecord};
