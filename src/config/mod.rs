//! Configuration module for the coverage backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Period of the background expiry sweep
    pub sweep_interval: Duration,
    /// Deadline for a whole sync pass, fetch and classification included
    pub sync_timeout: Duration,
    /// Per-request timeout for the classifier
    pub classifier_timeout: Duration,
    /// Endpoint returning raw chat messages
    pub feed_url: Option<String>,
    /// Endpoint classifying one raw message
    pub classifier_url: Option<String>,
    /// Roster seed loaded into an empty database
    pub seed_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("COVERAGE_DB_PATH")
            .unwrap_or_else(|_| "./data/coverage.sqlite".to_string())
            .into();

        let bind_addr = env::var("COVERAGE_BIND_ADDR")
            .ok()
            .and_then(|s| match s.parse() {
                Ok(addr) => Some(addr),
                Err(_) => {
                    eprintln!("Invalid COVERAGE_BIND_ADDR {:?}, using default", s);
                    None
                }
            })
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080)));

        let log_level = env::var("COVERAGE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            db_path,
            bind_addr,
            log_level,
            sweep_interval: secs_from_env("COVERAGE_SWEEP_INTERVAL_SECS", 60),
            sync_timeout: secs_from_env("COVERAGE_SYNC_TIMEOUT_SECS", 120),
            classifier_timeout: secs_from_env("COVERAGE_CLASSIFIER_TIMEOUT_SECS", 30),
            feed_url: non_empty_var("COVERAGE_FEED_URL"),
            classifier_url: non_empty_var("COVERAGE_CLASSIFIER_URL"),
            seed_path: non_empty_var("COVERAGE_SEED_PATH").map(PathBuf::from),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn secs_from_env(key: &str, default: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|s| *s > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}
