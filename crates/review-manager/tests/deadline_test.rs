mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{eq_str, review_req, setup_db};
use review_manager::proto::manager_server::Manager;
use review_manager::proto::*;
use review_manager::{
    ClientError, Database, ReviewClient, ReviewClientConfig, ReviewManagerService,
    ReviewServiceRunner, ServiceConfig,
};
use sea_orm::TransactionTrait;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tonic::{Code, Request};
use uuid::Uuid;

fn config(request_timeout_secs: u64) -> ServiceConfig {
    let mut config = ServiceConfig::new("sqlite::memory:");
    config.request_timeout_secs = request_timeout_secs;
    config
}

async fn count_app(svc: &ReviewManagerService, app_id: Uuid) -> u32 {
    svc.count_reviews(Request::new(CountReviewsRequest {
        conds: Some(Conds {
            app_id: eq_str(app_id.to_string()),
            ..Default::default()
        }),
    }))
    .await
    .unwrap()
    .into_inner()
    .info
}

#[tokio::test]
async fn test_stalled_writes_time_out_without_effect() {
    let db: Arc<Database> = setup_db().await;
    let svc = ReviewManagerService::new(db.clone(), &config(1));

    let existing = svc
        .create_review(Request::new(CreateReviewRequest {
            info: Some(review_req(Uuid::new_v4(), "kyc")),
        }))
        .await
        .unwrap()
        .into_inner()
        .info
        .unwrap();

    // Occupy the only pooled connection so every handler stalls
    let held = db.connection().begin().await.unwrap();

    let bulk_app = Uuid::new_v4();
    let status = svc
        .create_reviews(Request::new(CreateReviewsRequest {
            infos: vec![review_req(bulk_app, "withdraw"), review_req(bulk_app, "withdraw")],
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::DeadlineExceeded);

    let status = svc
        .update_review(Request::new(UpdateReviewRequest {
            info: Some(ReviewReq {
                id: Some(existing.id.clone()),
                state: Some(ReviewState::Rejected as i32),
                message: Some("stale document".to_string()),
                ..Default::default()
            }),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::DeadlineExceeded);

    held.rollback().await.unwrap();

    assert_eq!(count_app(&svc, bulk_app).await, 0);

    let current = svc
        .get_review(Request::new(GetReviewRequest {
            id: existing.id.clone(),
        }))
        .await
        .unwrap()
        .into_inner()
        .info
        .unwrap();
    assert_eq!(current.state, ReviewState::Wait as i32);
    assert!(current.message.is_empty());
    assert_eq!(current.updated_at, existing.updated_at);
}

#[tokio::test]
async fn test_timeout_status_over_grpc() {
    let db = setup_db().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());

    let runner = ReviewServiceRunner::with_database(config(1), db.clone());
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(runner.serve_with_listener(listener, async {
        shutdown_rx.await.ok();
    }));

    let mut patient = ReviewClient::connect(
        ReviewClientConfig::new(endpoint.clone()).with_timeout(Duration::from_secs(5)),
    )
    .await
    .unwrap();
    let mut hasty = ReviewClient::connect(
        ReviewClientConfig::new(endpoint).with_timeout(Duration::from_millis(300)),
    )
    .await
    .unwrap();

    let held = db.connection().begin().await.unwrap();

    // Server bound is stricter than the caller's deadline
    let err = patient
        .create_review(review_req(Uuid::new_v4(), "kyc"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Grpc(ref status) if status.code() == Code::DeadlineExceeded),
        "{err}"
    );

    // Caller's deadline is stricter and is enforced by the transport
    let err = hasty
        .create_review(review_req(Uuid::new_v4(), "kyc"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Grpc(ref status) if status.code() == Code::Cancelled),
        "{err}"
    );

    held.rollback().await.unwrap();
    assert_eq!(patient.count_reviews(Conds::default()).await.unwrap(), 0);

    drop(patient);
    drop(hasty);
    shutdown_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
