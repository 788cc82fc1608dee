//! Review storage operations
//!
//! Reads accept any [`ConnectionTrait`] so they run on the pool or inside a
//! caller's transaction. Bulk create and update open their own transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::conds::Conds;
use crate::entity::reviews;
use crate::error::{Result, ReviewError};
use crate::types::ReviewState;
use crate::validate::{NewReview, ReviewUpdate};

fn not_found(id: Uuid) -> ReviewError {
    ReviewError::not_found(format!("review {}", id))
}

fn active_model(review: NewReview, now: chrono::DateTime<Utc>) -> reviews::ActiveModel {
    reviews::ActiveModel {
        id: Set(review.id),
        app_id: Set(review.app_id),
        reviewer_id: Set(review.reviewer_id),
        domain: Set(review.domain),
        object_id: Set(review.object_id),
        trigger: Set(review.trigger),
        object_type: Set(review.object_type),
        state: Set(ReviewState::Wait),
        message: Set(String::new()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
}

/// Inserts one review in the `Wait` state.
pub async fn create<C: ConnectionTrait>(db: &C, review: NewReview) -> Result<reviews::Model> {
    let model = active_model(review, Utc::now()).insert(db).await?;
    debug!("Created review {} for object {}", model.id, model.object_id);
    Ok(model)
}

/// Inserts a validated batch atomically.
pub async fn create_bulk<C: TransactionTrait>(
    db: &C,
    batch: Vec<NewReview>,
) -> Result<Vec<reviews::Model>> {
    let now = Utc::now();
    let txn = db.begin().await?;

    let mut created = Vec::with_capacity(batch.len());
    for review in batch {
        created.push(active_model(review, now).insert(&txn).await?);
    }

    txn.commit().await?;
    debug!("Created {} reviews", created.len());
    Ok(created)
}

/// Applies a state and message change under a row lock.
pub async fn update<C: TransactionTrait>(db: &C, update: ReviewUpdate) -> Result<reviews::Model> {
    let txn = db.begin().await?;

    let current = reviews::Entity::find_by_id(update.id)
        .filter(reviews::Column::DeletedAt.is_null())
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| not_found(update.id))?;

    // Dropping the transaction on error releases the lock and rolls back.
    let (state, message) = update.apply(&current)?;
    let previous = current.state;

    let mut active: reviews::ActiveModel = current.into();
    active.state = Set(state);
    active.message = Set(message);
    active.updated_at = Set(Utc::now());
    let model = active.update(&txn).await?;

    txn.commit().await?;
    debug!("Updated review {}: {} -> {}", model.id, previous, model.state);
    Ok(model)
}

/// Fetches a live review by id.
pub async fn row<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<reviews::Model> {
    reviews::Entity::find_by_id(id)
        .filter(reviews::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Fetches the single review matching `conds`.
pub async fn row_only<C: ConnectionTrait>(db: &C, conds: &Conds) -> Result<reviews::Model> {
    let mut found = conds.select().limit(2).all(db).await?;
    match found.len() {
        0 => Err(ReviewError::not_found("review matching conditions")),
        1 => Ok(found.remove(0)),
        _ => {
            let count = conds.select().count(db).await?;
            Err(ReviewError::MultipleRows {
                count: usize::try_from(count).unwrap_or(usize::MAX),
            })
        }
    }
}

/// Returns one page of matches, most recently updated first, and the total
/// number of matches. A zero `limit` returns every match after `offset`.
pub async fn rows<C: ConnectionTrait>(
    db: &C,
    conds: &Conds,
    offset: u32,
    limit: u32,
) -> Result<(Vec<reviews::Model>, u64)> {
    let total = conds.select().count(db).await?;

    let page = conds
        .select()
        .order_by_desc(reviews::Column::UpdatedAt)
        .order_by_asc(reviews::Column::Id)
        .offset((offset > 0).then_some(u64::from(offset)))
        .limit((limit > 0).then_some(u64::from(limit)))
        .all(db)
        .await?;

    Ok((page, total))
}

/// Counts live reviews matching `conds`.
pub async fn count<C: ConnectionTrait>(db: &C, conds: &Conds) -> Result<u64> {
    Ok(conds.select().count(db).await?)
}

/// Whether a live review with this id exists.
pub async fn exist<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool> {
    let found = reviews::Entity::find_by_id(id)
        .filter(reviews::Column::DeletedAt.is_null())
        .select_only()
        .column(reviews::Column::Id)
        .into_tuple::<Uuid>()
        .one(db)
        .await?;
    Ok(found.is_some())
}

/// Whether any live review matches `conds`.
pub async fn exist_conds<C: ConnectionTrait>(db: &C, conds: &Conds) -> Result<bool> {
    let found = conds
        .select()
        .select_only()
        .column(reviews::Column::Id)
        .limit(1)
        .into_tuple::<Uuid>()
        .one(db)
        .await?;
    Ok(found.is_some())
}

/// Soft deletes a review. Deleting an already deleted review refreshes its
/// `deleted_at`.
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<reviews::Model> {
    let current = reviews::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(id))?;

    let mut active: reviews::ActiveModel = current.into();
    active.deleted_at = Set(Some(Utc::now()));
    let model = active.update(db).await?;

    debug!("Deleted review {}", model.id);
    Ok(model)
}
