//! Logging initialization for the review manager
//!
//! ## Environment Variables
//!
//! - `LOG_DESTINATION`: "console" (default) or "file" for daily rotating files
//! - `LOG_DIR`: directory for log files (default: "./logs")
//! - `LOG_FILE_PREFIX`: prefix for log file names (default: "review-manager")
//! - `RUST_LOG`: filter directives; falls back to the level passed in

use anyhow::{anyhow, Result};
use std::env;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "review_manager={level},tower_http=info,sqlx=warn,{level}",
            level = default_level
        ))
    })
}

/// Install the global tracing subscriber.
///
/// When logging to files the returned guard must be held for the lifetime of
/// the process; dropping it stops the background writer.
pub fn init_logging(default_level: &str) -> Result<Option<WorkerGuard>> {
    let destination = env::var("LOG_DESTINATION").unwrap_or_else(|_| "console".to_string());

    match destination.to_lowercase().as_str() {
        "file" => {
            let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
            let prefix =
                env::var("LOG_FILE_PREFIX").unwrap_or_else(|_| "review-manager".to_string());

            std::fs::create_dir_all(&log_dir)
                .map_err(|e| anyhow!("Failed to create log directory '{}': {}", log_dir, e))?;

            let appender = rolling::daily(&log_dir, &prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(env_filter(default_level))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true),
                )
                .try_init()
                .map_err(|e| anyhow!("Failed to initialize file logging: {}", e))?;

            info!("Logging to daily files: {}/{}.YYYY-MM-DD", log_dir, prefix);
            Ok(Some(guard))
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter(default_level))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stdout)
                        .with_target(false),
                )
                .try_init()
                .map_err(|e| anyhow!("Failed to initialize console logging: {}", e))?;

            Ok(None)
        }
    }
}
