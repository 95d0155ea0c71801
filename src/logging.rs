// 📝 Logging setup
// RUST_LOG wins; otherwise the configured level applies to this crate.

use crate::settings::LogConfig;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bakery_pricing={}", config.level)))
}

/// Console commands and the HTTP server: log to stderr.
pub fn init_stderr(config: &LogConfig) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Terminal UI: the alternate screen owns stdout/stderr, so log to a file.
/// Falls back to no logging at all if the file can't be opened.
pub fn init_file(config: &LogConfig) {
    if let Some(parent) = config.file.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = match OpenOptions::new().create(true).append(true).open(&config.file) {
        Ok(file) => file,
        Err(_) => return,
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init();
}
