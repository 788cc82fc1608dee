//! Database connection for review storage

use std::time::Duration;

use anyhow::{anyhow, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaOrmDatabase, DatabaseConnection, Schema,
};
use tracing::{error, info, warn};

use crate::config::ServiceConfig;
use crate::entity::reviews;

/// Review database connection wrapper
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Connect with pool settings from `config`, retrying transient failures.
    pub async fn new(config: &ServiceConfig) -> Result<Self> {
        let masked = mask_connection_string(&config.database_url);
        info!("Connecting to review database: {}", masked);

        let mut attempts = 0;
        const MAX_ATTEMPTS: u32 = 3;
        const RETRY_DELAY: Duration = Duration::from_secs(2);

        loop {
            attempts += 1;

            let mut opt = ConnectOptions::new(config.database_url.clone());
            opt.max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .connect_timeout(config.connect_timeout())
                .acquire_timeout(config.connect_timeout())
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(3600))
                .sqlx_logging(config.enable_sql_logging)
                .sqlx_logging_level(tracing::log::LevelFilter::Debug)
                .sqlx_slow_statements_logging_settings(
                    tracing::log::LevelFilter::Warn,
                    Duration::from_millis(500),
                );

            match SeaOrmDatabase::connect(opt).await {
                Ok(connection) => {
                    connection
                        .ping()
                        .await
                        .map_err(|e| anyhow!("Database ping failed: {}", e))?;
                    info!(
                        "Connected to review database (max: {}, min: {})",
                        config.max_connections, config.min_connections
                    );
                    return Ok(Self { connection });
                }
                Err(e) if attempts < MAX_ATTEMPTS => {
                    warn!(
                        "Failed to connect to {} (attempt {}/{}): {}",
                        masked, attempts, MAX_ATTEMPTS, e
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => {
                    error!("Failed to connect to {} after {} attempts", masked, MAX_ATTEMPTS);
                    return Err(anyhow!("Database connection failed: {}", e));
                }
            }
        }
    }

    /// Wrap an already established connection.
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Get a reference to the database connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub async fn health_check(&self) -> crate::error::Result<()> {
        Ok(self.connection.ping().await?)
    }

    /// Create the reviews table from the entity definition if it is missing.
    pub async fn create_schema(&self) -> crate::error::Result<()> {
        let backend = self.connection.get_database_backend();
        let mut stmt = Schema::new(backend).create_table_from_entity(reviews::Entity);
        stmt.if_not_exists();
        self.connection.execute(backend.build(&stmt)).await?;
        info!("Ensured reviews table exists");
        Ok(())
    }
}

/// Mask the password of a database URL for logging
pub fn mask_connection_string(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some("****")).is_ok() {
                parsed.to_string()
            } else {
                "****".to_string()
            }
        }
        Ok(_) => url.to_string(),
        // Unparseable URLs may still carry credentials before '@'
        Err(_) => match (url.find("//"), url.rfind('@')) {
            (Some(scheme_end), Some(at)) if scheme_end < at => {
                format!("{}****{}", &url[..scheme_end + 2], &url[at..])
            }
            _ => url.to_string(),
        },
    }
}
