//! Review manager
//!
//! This crate provides:
//! - gRPC `review.manager.v1.Manager` service implementation
//! - TiDB/MySQL storage for review records through sea-orm
//! - Condition sets compiled into parameterized filters
//! - A typed client for the service
//!
//! Can be used as a library or standalone binary

pub mod client;
pub mod conds;
pub mod config;
pub mod converter;
pub mod crud;
pub mod database;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod service;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use client::{ClientError, ReviewClient, ReviewClientConfig};
pub use conds::{CondValue, Conds, Field, Op};
pub use config::ServiceConfig;
pub use database::Database;
pub use error::{Result, ReviewError};
pub use handlers::ReviewManagerService;
pub use service::ReviewServiceRunner;
pub use types::{ObjectType, ReviewState, Trigger};

// Re-export proto types
pub mod proto {
    tonic::include_proto!("review.manager.v1");

    // File descriptor set for gRPC reflection
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("review_descriptor");
}
