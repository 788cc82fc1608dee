mod common;

use std::time::Duration;

use common::{eq_enum, eq_str, review_req, setup_db};
use review_manager::proto::{Conds, ReviewReq, ReviewState};
use review_manager::{ClientError, ReviewClient, ReviewClientConfig, ReviewServiceRunner, ServiceConfig};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tonic::Code;
use uuid::Uuid;

#[tokio::test]
async fn test_client_round_trip_over_grpc() {
    let db = setup_db().await;
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let runner = ReviewServiceRunner::with_database(ServiceConfig::new("sqlite::memory:"), db);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(runner.serve_with_listener(listener, async {
        shutdown_rx.await.ok();
    }));

    let config = ReviewClientConfig::new(format!("http://{}", addr)).with_timeout(Duration::from_secs(5));
    let mut client = ReviewClient::connect(config).await.unwrap();

    let app_id = Uuid::new_v4();
    let created = client
        .create_reviews(vec![review_req(app_id, "kyc"), review_req(app_id, "withdraw")])
        .await
        .unwrap();
    assert_eq!(created.len(), 2);

    let single = client.create_review(review_req(app_id, "kyc")).await.unwrap();
    assert_eq!(single.state, ReviewState::Wait as i32);

    let err = client
        .update_review(ReviewReq {
            id: Some(single.id.clone()),
            state: Some(ReviewState::Rejected as i32),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Grpc(ref status) if status.code() == Code::InvalidArgument));

    let rejected = client
        .update_review(ReviewReq {
            id: Some(single.id.clone()),
            state: Some(ReviewState::Rejected as i32),
            message: Some("selfie does not match".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rejected.message, "selfie does not match");

    let fetched = client.get_review(single.id.clone()).await.unwrap();
    assert_eq!(fetched.state, ReviewState::Rejected as i32);

    let by_state = Conds {
        app_id: eq_str(app_id.to_string()),
        state: eq_enum(ReviewState::Rejected as i32),
        ..Default::default()
    };
    assert_eq!(client.get_review_only(by_state.clone()).await.unwrap().id, single.id);
    assert!(client.exist_review_conds(by_state).await.unwrap());

    let by_app = Conds {
        app_id: eq_str(app_id.to_string()),
        ..Default::default()
    };
    let (page, total) = client.get_reviews(by_app.clone(), 0, 2).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].id, single.id);

    client.delete_review(single.id.clone()).await.unwrap();
    assert!(!client.exist_review(single.id.clone()).await.unwrap());
    assert_eq!(client.count_reviews(by_app).await.unwrap(), 2);

    let err = client.get_review(single.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Grpc(ref status) if status.code() == Code::NotFound));

    drop(client);
    shutdown_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
