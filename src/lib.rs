pub mod clients;
pub mod config;
pub mod dashboard;
pub mod deserializers;
pub mod error;
pub mod frameworks;
pub mod results;
pub mod scenario;
pub mod schemas;

pub use error::{DashboardError, Result};

/// Install the fmt subscriber for `filter` (normally `config.runtime.log_level`).
/// Output goes to stderr so tables on stdout stay clean.
pub fn init_tracing(filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config::DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
