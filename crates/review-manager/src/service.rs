//! Review manager gRPC server

use anyhow::{anyhow, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Router;
use tonic::transport::Server;
use tracing::info;

use crate::{
    config::ServiceConfig, database::Database, handlers::ReviewManagerService,
    proto::manager_server::ManagerServer,
};

/// Owns the connection pool and serves the Manager service
pub struct ReviewServiceRunner {
    config: ServiceConfig,
    db: Arc<Database>,
}

impl ReviewServiceRunner {
    /// Connect to the database and prepare the schema if configured to.
    pub async fn new(config: ServiceConfig) -> Result<Self> {
        let db = Database::new(&config).await?;
        if config.create_schema {
            db.create_schema().await?;
        }
        Ok(Self::with_database(config, Arc::new(db)))
    }

    /// Serve over an existing database handle.
    pub fn with_database(config: ServiceConfig, db: Arc<Database>) -> Self {
        Self { config, db }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    fn router(&self) -> Result<Router> {
        let service = ReviewManagerService::new(self.db.clone(), &self.config);

        // Request timeout is enforced per handler, not by the transport
        let router = Server::builder().add_service(ManagerServer::new(service));

        if !self.config.enable_reflection {
            return Ok(router);
        }
        let reflection = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(crate::proto::FILE_DESCRIPTOR_SET)
            .build_v1alpha()?;
        Ok(router.add_service(reflection))
    }

    /// Serve on the configured listen address until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr: SocketAddr = self
            .config
            .listen_addr
            .parse()
            .map_err(|e| anyhow!("Invalid listen address '{}': {}", self.config.listen_addr, e))?;

        info!("Starting review manager on {}", addr);
        self.router()?
            .serve_with_shutdown(addr, shutdown)
            .await
            .map_err(|e| anyhow!("Server error: {}", e))
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_with_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        info!("Starting review manager on {}", listener.local_addr()?);
        self.router()?
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await
            .map_err(|e| anyhow!("Server error: {}", e))
    }
}
