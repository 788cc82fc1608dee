//! Typed client for the review Manager service

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tonic::{IntoRequest, Request};
use tracing::{info, warn};

use crate::proto::manager_client::ManagerClient;
use crate::proto::*;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:50051";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
    #[error("Response missing {0}")]
    MissingField(&'static str),
}

/// Connection settings for [`ReviewClient`]
#[derive(Debug, Clone)]
pub struct ReviewClientConfig {
    /// Server endpoint, e.g. "http://review-manager:50051"
    pub endpoint: String,
    /// Deadline sent with every call as `grpc-timeout`
    pub timeout: Duration,
}

impl ReviewClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `REVIEW_MANAGER_ENDPOINT`, falling back to a local default.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let endpoint = std::env::var("REVIEW_MANAGER_ENDPOINT").unwrap_or_else(|_| {
            warn!("REVIEW_MANAGER_ENDPOINT not set, using {}", DEFAULT_ENDPOINT);
            DEFAULT_ENDPOINT.to_string()
        });
        Self::new(endpoint)
    }
}

/// Client wrapper returning records instead of response envelopes
#[derive(Clone)]
pub struct ReviewClient {
    inner: ManagerClient<Channel>,
    timeout: Duration,
}

impl ReviewClient {
    pub async fn connect(config: ReviewClientConfig) -> Result<Self, ClientError> {
        info!("Connecting to review manager at {}", config.endpoint);
        let channel = Endpoint::from_shared(config.endpoint)?
            .connect_timeout(config.timeout)
            .connect()
            .await?;
        Ok(Self {
            inner: ManagerClient::new(channel),
            timeout: config.timeout,
        })
    }

    pub async fn from_env() -> Result<Self, ClientError> {
        Self::connect(ReviewClientConfig::from_env()).await
    }

    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = message.into_request();
        request.set_timeout(self.timeout);
        request
    }

    pub async fn create_review(&mut self, info: ReviewReq) -> Result<Review, ClientError> {
        let request = self.request(CreateReviewRequest { info: Some(info) });
        let response = self.inner.create_review(request).await?.into_inner();
        response.info.ok_or(ClientError::MissingField("info"))
    }

    /// Creates every review or none.
    pub async fn create_reviews(&mut self, infos: Vec<ReviewReq>) -> Result<Vec<Review>, ClientError> {
        let request = self.request(CreateReviewsRequest { infos });
        Ok(self.inner.create_reviews(request).await?.into_inner().infos)
    }

    pub async fn update_review(&mut self, info: ReviewReq) -> Result<Review, ClientError> {
        let request = self.request(UpdateReviewRequest { info: Some(info) });
        let response = self.inner.update_review(request).await?.into_inner();
        response.info.ok_or(ClientError::MissingField("info"))
    }

    pub async fn get_review(&mut self, id: impl Into<String>) -> Result<Review, ClientError> {
        let request = self.request(GetReviewRequest { id: id.into() });
        let response = self.inner.get_review(request).await?.into_inner();
        response.info.ok_or(ClientError::MissingField("info"))
    }

    pub async fn get_review_only(&mut self, conds: Conds) -> Result<Review, ClientError> {
        let request = self.request(GetReviewOnlyRequest { conds: Some(conds) });
        let response = self.inner.get_review_only(request).await?.into_inner();
        response.info.ok_or(ClientError::MissingField("info"))
    }

    /// Returns one page of matches and the total number of matches.
    pub async fn get_reviews(
        &mut self,
        conds: Conds,
        offset: u32,
        limit: u32,
    ) -> Result<(Vec<Review>, u32), ClientError> {
        let request = self.request(GetReviewsRequest {
            conds: Some(conds),
            offset,
            limit,
        });
        let response = self.inner.get_reviews(request).await?.into_inner();
        Ok((response.infos, response.total))
    }

    pub async fn exist_review(&mut self, id: impl Into<String>) -> Result<bool, ClientError> {
        let request = self.request(ExistReviewRequest { id: id.into() });
        Ok(self.inner.exist_review(request).await?.into_inner().info)
    }

    pub async fn exist_review_conds(&mut self, conds: Conds) -> Result<bool, ClientError> {
        let request = self.request(ExistReviewCondsRequest { conds: Some(conds) });
        Ok(self.inner.exist_review_conds(request).await?.into_inner().info)
    }

    pub async fn count_reviews(&mut self, conds: Conds) -> Result<u32, ClientError> {
        let request = self.request(CountReviewsRequest { conds: Some(conds) });
        Ok(self.inner.count_reviews(request).await?.into_inner().info)
    }

    pub async fn delete_review(&mut self, id: impl Into<String>) -> Result<Review, ClientError> {
        let request = self.request(DeleteReviewRequest { id: id.into() });
        let response = self.inner.delete_review(request).await?.into_inner();
        response.info.ok_or(ClientError::MissingField("info"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ReviewClientConfig::new("http://localhost:50051");
        assert_eq!(config.timeout, Duration::from_secs(10));

        let config = config.with_timeout(Duration::from_millis(500));
        assert_eq!(config.timeout, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let result = ReviewClient::connect(ReviewClientConfig::new("not a uri")).await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
