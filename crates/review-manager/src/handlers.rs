//! gRPC handlers for the review Manager service

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tonic::{Request, Response, Status};
use tracing::{debug, error, warn};

use crate::{
    conds::Conds,
    config::ServiceConfig,
    converter::{review_to_proto, reviews_to_proto},
    crud,
    database::Database,
    error::ReviewError,
    proto::manager_server::Manager,
    proto::*,
    validate::{self, parse_uuid, NewReview, ReviewUpdate},
};

/// Manager service implementation
pub struct ReviewManagerService {
    db: Arc<Database>,
    request_timeout: Duration,
    redact_internal_errors: bool,
}

impl ReviewManagerService {
    pub fn new(db: Arc<Database>, config: &ServiceConfig) -> Self {
        Self {
            db,
            request_timeout: config.request_timeout(),
            redact_internal_errors: config.redact_internal_errors,
        }
    }

    /// Runs `op` under the configured request timeout and maps its error
    /// to a status. A zero timeout leaves `op` unbounded.
    ///
    /// The caller's own `grpc-timeout` is enforced by tonic ahead of this
    /// bound and surfaces as `Cancelled`.
    async fn run<T, F>(&self, rpc: &'static str, op: F) -> Result<T, Status>
    where
        F: Future<Output = crate::error::Result<T>>,
    {
        let limit = self.request_timeout;
        let outcome = if limit.is_zero() {
            op.await
        } else {
            tokio::time::timeout(limit, op)
                .await
                .unwrap_or(Err(ReviewError::DeadlineExceeded(limit)))
        };
        outcome.map_err(|err| self.fail(rpc, err))
    }

    fn fail(&self, rpc: &str, err: ReviewError) -> Status {
        if err.is_internal() {
            error!(rpc = %rpc, "Request failed: {}", err);
            if self.redact_internal_errors {
                return Status::internal("internal error");
            }
        } else if err.is_validation() {
            warn!(rpc = %rpc, "Rejected request: {}", err);
        } else {
            debug!(rpc = %rpc, "{}", err);
        }
        err.into()
    }
}

fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[tonic::async_trait]
impl Manager for ReviewManagerService {
    async fn create_review(
        &self,
        request: Request<CreateReviewRequest>,
    ) -> Result<Response<CreateReviewResponse>, Status> {
        let info = request.into_inner().info.unwrap_or_default();

        let review = self
            .run("CreateReview", async {
                let review = NewReview::try_from(&info)?;
                crud::create(self.db.connection(), review).await
            })
            .await?;

        Ok(Response::new(CreateReviewResponse {
            info: Some(review_to_proto(&review)),
        }))
    }

    async fn create_reviews(
        &self,
        request: Request<CreateReviewsRequest>,
    ) -> Result<Response<CreateReviewsResponse>, Status> {
        let infos = request.into_inner().infos;

        let reviews = self
            .run("CreateReviews", async {
                let batch = validate::new_reviews(&infos)?;
                crud::create_bulk(self.db.connection(), batch).await
            })
            .await?;

        Ok(Response::new(CreateReviewsResponse {
            infos: reviews_to_proto(&reviews),
        }))
    }

    async fn update_review(
        &self,
        request: Request<UpdateReviewRequest>,
    ) -> Result<Response<UpdateReviewResponse>, Status> {
        let info = request.into_inner().info.unwrap_or_default();

        let review = self
            .run("UpdateReview", async {
                let update = ReviewUpdate::try_from(&info)?;
                crud::update(self.db.connection(), update).await
            })
            .await?;

        Ok(Response::new(UpdateReviewResponse {
            info: Some(review_to_proto(&review)),
        }))
    }

    async fn get_review(
        &self,
        request: Request<GetReviewRequest>,
    ) -> Result<Response<GetReviewResponse>, Status> {
        let id = request.into_inner().id;

        let review = self
            .run("GetReview", async {
                let id = parse_uuid("id", &id)?;
                crud::row(self.db.connection(), id).await
            })
            .await?;

        Ok(Response::new(GetReviewResponse {
            info: Some(review_to_proto(&review)),
        }))
    }

    async fn get_review_only(
        &self,
        request: Request<GetReviewOnlyRequest>,
    ) -> Result<Response<GetReviewOnlyResponse>, Status> {
        let conds = request.into_inner().conds;

        let review = self
            .run("GetReviewOnly", async {
                let conds = Conds::try_from(conds.as_ref())?;
                crud::row_only(self.db.connection(), &conds).await
            })
            .await?;

        Ok(Response::new(GetReviewOnlyResponse {
            info: Some(review_to_proto(&review)),
        }))
    }

    async fn get_reviews(
        &self,
        request: Request<GetReviewsRequest>,
    ) -> Result<Response<GetReviewsResponse>, Status> {
        let req = request.into_inner();

        let (reviews, total) = self
            .run("GetReviews", async {
                let conds = Conds::try_from(req.conds.as_ref())?;
                crud::rows(self.db.connection(), &conds, req.offset, req.limit).await
            })
            .await?;

        Ok(Response::new(GetReviewsResponse {
            infos: reviews_to_proto(&reviews),
            total: saturating_u32(total),
        }))
    }

    async fn exist_review(
        &self,
        request: Request<ExistReviewRequest>,
    ) -> Result<Response<ExistReviewResponse>, Status> {
        let id = request.into_inner().id;

        let exists = self
            .run("ExistReview", async {
                let id = parse_uuid("id", &id)?;
                crud::exist(self.db.connection(), id).await
            })
            .await?;

        Ok(Response::new(ExistReviewResponse { info: exists }))
    }

    async fn exist_review_conds(
        &self,
        request: Request<ExistReviewCondsRequest>,
    ) -> Result<Response<ExistReviewCondsResponse>, Status> {
        let conds = request.into_inner().conds;

        let exists = self
            .run("ExistReviewConds", async {
                let conds = Conds::try_from(conds.as_ref())?;
                crud::exist_conds(self.db.connection(), &conds).await
            })
            .await?;

        Ok(Response::new(ExistReviewCondsResponse { info: exists }))
    }

    async fn count_reviews(
        &self,
        request: Request<CountReviewsRequest>,
    ) -> Result<Response<CountReviewsResponse>, Status> {
        let conds = request.into_inner().conds;

        let total = self
            .run("CountReviews", async {
                let conds = Conds::try_from(conds.as_ref())?;
                crud::count(self.db.connection(), &conds).await
            })
            .await?;

        Ok(Response::new(CountReviewsResponse {
            info: saturating_u32(total),
        }))
    }

    async fn delete_review(
        &self,
        request: Request<DeleteReviewRequest>,
    ) -> Result<Response<DeleteReviewResponse>, Status> {
        let id = request.into_inner().id;

        let review = self
            .run("DeleteReview", async {
                let id = parse_uuid("id", &id)?;
                crud::delete(self.db.connection(), id).await
            })
            .await?;

        Ok(Response::new(DeleteReviewResponse {
            info: Some(review_to_proto(&review)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conds::Conds;
    use sea_orm::{ConnectOptions, TransactionTrait};
    use tonic::Code;
    use uuid::Uuid;

    async fn service(request_timeout_secs: u64) -> (Arc<Database>, ReviewManagerService) {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Arc::new(Database::from_connection(
            sea_orm::Database::connect(opt).await.unwrap(),
        ));
        db.create_schema().await.unwrap();

        let mut config = ServiceConfig::new("sqlite::memory:");
        config.request_timeout_secs = request_timeout_secs;
        let svc = ReviewManagerService::new(db.clone(), &config);
        (db, svc)
    }

    fn review_req() -> ReviewReq {
        ReviewReq {
            app_id: Some(Uuid::new_v4().to_string()),
            reviewer_id: Some(Uuid::new_v4().to_string()),
            domain: Some("withdraw".to_string()),
            object_id: Some(Uuid::new_v4().to_string()),
            trigger: Some(ReviewTriggerType::LargeAmount as i32),
            object_type: Some(ReviewObjectType::Withdrawal as i32),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_timeout_mid_transaction_rolls_back() {
        let (db, svc) = service(1).await;
        let req = review_req();

        let status = svc
            .run("CreateReviews", async {
                let txn = db.connection().begin().await?;
                crud::create(&txn, NewReview::try_from(&req)?).await?;
                std::future::pending::<()>().await;
                txn.commit().await?;
                Ok::<_, ReviewError>(())
            })
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::DeadlineExceeded);

        let total = crud::count(db.connection(), &Conds::new()).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_zero_timeout_is_unbounded() {
        let (_db, svc) = service(0).await;

        let value = svc
            .run("CountReviews", async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, ReviewError>(7u32)
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_saturating_u32() {
        assert_eq!(saturating_u32(7), 7);
        assert_eq!(saturating_u32(u64::MAX), u32::MAX);
    }
}
