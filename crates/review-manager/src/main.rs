//! Review manager service binary

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use review_manager::database::mask_connection_string;
use review_manager::{logging, ReviewServiceRunner, ServiceConfig};

#[derive(Parser, Debug)]
#[clap(name = "review-manager")]
#[clap(about = "Review Manager - gRPC service for review records")]
struct Args {
    /// Database connection URL (can also be set via REVIEW_DATABASE_URL env var)
    #[clap(long, env = "REVIEW_DATABASE_URL")]
    database_url: String,

    /// Listen address for gRPC server
    #[clap(long, default_value = "0.0.0.0:50051", env = "REVIEW_LISTEN_ADDR")]
    listen_addr: String,

    /// Disable gRPC reflection
    #[clap(long, env = "REVIEW_DISABLE_REFLECTION")]
    disable_reflection: bool,

    /// Maximum database connections in pool
    #[clap(long, default_value_t = 50, env = "REVIEW_MAX_CONNECTIONS")]
    max_connections: u32,

    /// Minimum idle database connections
    #[clap(long, default_value_t = 5, env = "REVIEW_MIN_CONNECTIONS")]
    min_connections: u32,

    /// Database connection timeout in seconds
    #[clap(long, default_value_t = 10, env = "REVIEW_CONNECT_TIMEOUT_SECS")]
    connect_timeout_secs: u64,

    /// Per-request deadline in seconds (0 disables it)
    #[clap(long, default_value_t = 10, env = "REVIEW_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: u64,

    /// Log SQL statements
    #[clap(long, env = "REVIEW_SQL_LOGGING")]
    sql_logging: bool,

    /// Create the reviews table on startup if missing
    #[clap(long, env = "REVIEW_CREATE_SCHEMA")]
    create_schema: bool,

    /// Hide storage error details from clients
    #[clap(long, env = "REVIEW_REDACT_INTERNAL_ERRORS")]
    redact_internal_errors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[clap(long, default_value = "info", env = "REVIEW_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenv().ok();

    let args = Args::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = logging::init_logging(&args.log_level)?;

    tracing::info!("Starting Review Manager");
    tracing::info!("Database URL: {}", mask_connection_string(&args.database_url));
    tracing::info!("Listen address: {}", args.listen_addr);

    let config = ServiceConfig {
        database_url: args.database_url,
        listen_addr: args.listen_addr,
        enable_reflection: !args.disable_reflection,
        max_connections: args.max_connections,
        min_connections: args.min_connections,
        connect_timeout_secs: args.connect_timeout_secs,
        request_timeout_secs: args.request_timeout_secs,
        enable_sql_logging: args.sql_logging,
        create_schema: args.create_schema,
        redact_internal_errors: args.redact_internal_errors,
    };

    let service = ReviewServiceRunner::new(config).await?;

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received shutdown signal"),
            Err(e) => {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    if let Err(e) = service.run(shutdown).await {
        tracing::error!("Service error: {}", e);
        return Err(e);
    }

    tracing::info!("Review manager stopped");
    Ok(())
}
