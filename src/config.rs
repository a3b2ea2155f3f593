use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "wisdom-api", version, about = "Serve Tibetan wisdom quotes over HTTP")]
pub struct Config {
    /// Server bind address
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8000")]
    pub bind_address: SocketAddr,

    /// Path to the quotes collection JSON document
    #[arg(long, env = "DATA_FILE", default_value = "tibetan_quotes_collection.json")]
    pub data_file: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable per-client rate limiting
    #[arg(
        long,
        env = "RATE_LIMIT_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub rate_limit_enabled: bool,

    /// Interval between sweeps of expired rate limit windows, in seconds
    #[arg(long, env = "CLEANUP_INTERVAL_SECS", default_value_t = 300)]
    pub cleanup_interval_secs: u64,
}

impl Config {
    /// Load configuration from command line arguments, falling back to the environment
    pub fn from_env() -> Self {
        Config::parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8000)),
            data_file: PathBuf::from("tibetan_quotes_collection.json"),
            log_level: "info".to_string(),
            rate_limit_enabled: true,
            cleanup_interval_secs: 300,
        }
    }
}
