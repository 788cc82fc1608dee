#![allow(dead_code)]

use std::sync::Arc;

use review_manager::proto::{self, ReviewReq};
use review_manager::{Database, ObjectType, Trigger};
use sea_orm::ConnectOptions;
use uuid::Uuid;

/// Fresh in-memory database with the reviews table.
///
/// The pool is pinned to one connection: every SQLite memory connection
/// opens its own empty database.
pub async fn setup_db() -> Arc<Database> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let connection = sea_orm::Database::connect(opt)
        .await
        .expect("Failed to open in-memory database");
    let db = Database::from_connection(connection);
    db.health_check().await.expect("In-memory database not reachable");
    db.create_schema().await.expect("Failed to create schema");
    Arc::new(db)
}

pub fn review_req(app_id: Uuid, domain: &str) -> ReviewReq {
    ReviewReq {
        app_id: Some(app_id.to_string()),
        reviewer_id: Some(Uuid::new_v4().to_string()),
        domain: Some(domain.to_string()),
        object_id: Some(Uuid::new_v4().to_string()),
        trigger: Some(Trigger::LargeAmount.to_wire()),
        object_type: Some(ObjectType::Withdrawal.to_wire()),
        ..Default::default()
    }
}

pub fn eq_str(value: impl Into<String>) -> Option<proto::StringVal> {
    Some(proto::StringVal {
        op: "eq".to_string(),
        value: value.into(),
    })
}

pub fn eq_enum(value: i32) -> Option<proto::Uint32Val> {
    Some(proto::Uint32Val {
        op: "eq".to_string(),
        value: value as u32,
    })
}
