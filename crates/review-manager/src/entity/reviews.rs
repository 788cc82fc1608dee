//! reviews entity
//! One row per review; rows are soft deleted through `deleted_at`

use sea_orm::entity::prelude::*;

use crate::types::{ObjectType, ReviewState, Trigger};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub app_id: Uuid,
    pub reviewer_id: Uuid,
    pub domain: String,
    pub object_id: Uuid,
    pub trigger: Trigger,
    pub object_type: ObjectType,
    pub state: ReviewState,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// NULL while the review is live
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
