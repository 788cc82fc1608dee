//! Conversion from stored reviews to wire messages

use chrono::{DateTime, Utc};

use crate::entity::reviews;
use crate::proto;

/// Unix seconds clamped into the wire's `uint32` range.
fn to_unix_secs(ts: &DateTime<Utc>) -> u32 {
    u32::try_from(ts.timestamp().max(0)).unwrap_or(u32::MAX)
}

pub fn review_to_proto(model: &reviews::Model) -> proto::Review {
    proto::Review {
        id: model.id.to_string(),
        app_id: model.app_id.to_string(),
        reviewer_id: model.reviewer_id.to_string(),
        domain: model.domain.clone(),
        object_id: model.object_id.to_string(),
        trigger: model.trigger.to_wire(),
        object_type: model.object_type.to_wire(),
        state: model.state.to_wire(),
        message: model.message.clone(),
        created_at: to_unix_secs(&model.created_at),
        updated_at: to_unix_secs(&model.updated_at),
        // 0 means not deleted
        deleted_at: model.deleted_at.as_ref().map(to_unix_secs).unwrap_or(0),
    }
}

pub fn reviews_to_proto(models: &[reviews::Model]) -> Vec<proto::Review> {
    models.iter().map(review_to_proto).collect()
}
