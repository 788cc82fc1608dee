//! Request validation
//!
//! Wire requests are turned into checked values here before any storage
//! access. Everything in this module is synchronous and pure.

use uuid::Uuid;

use crate::entity::reviews;
use crate::error::{Result, ReviewError};
use crate::proto;
use crate::types::{ObjectType, ReviewState, Trigger};

/// Parses a UUID field, naming the field in the error.
pub fn parse_uuid(field: &str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|_| ReviewError::invalid(format!("invalid {}: '{}'", field, value)))
}

fn required_uuid(field: &str, value: Option<&String>) -> Result<Uuid> {
    match value {
        Some(value) => parse_uuid(field, value),
        None => Err(ReviewError::invalid(format!("invalid {}: missing", field))),
    }
}

/// A review ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub id: Uuid,
    pub app_id: Uuid,
    pub reviewer_id: Uuid,
    pub domain: String,
    pub object_id: Uuid,
    pub trigger: Trigger,
    pub object_type: ObjectType,
}

impl TryFrom<&proto::ReviewReq> for NewReview {
    type Error = ReviewError;

    /// Any `state` or `message` in the request is ignored: new reviews
    /// always start in `Wait`.
    fn try_from(req: &proto::ReviewReq) -> Result<Self> {
        let id = match req.id.as_deref() {
            Some(id) => parse_uuid("id", id)?,
            None => Uuid::new_v4(),
        };
        let app_id = required_uuid("app_id", req.app_id.as_ref())?;
        let reviewer_id = required_uuid("reviewer_id", req.reviewer_id.as_ref())?;
        let object_id = required_uuid("object_id", req.object_id.as_ref())?;

        let domain = match req.domain.as_deref() {
            Some(domain) if !domain.is_empty() => domain.to_string(),
            _ => return Err(ReviewError::invalid("invalid domain")),
        };

        let trigger = req
            .trigger
            .ok_or_else(|| ReviewError::invalid("invalid trigger: missing"))
            .and_then(Trigger::from_wire)?;
        let object_type = req
            .object_type
            .ok_or_else(|| ReviewError::invalid("invalid object type: missing"))
            .and_then(ObjectType::from_wire)?;

        Ok(Self {
            id,
            app_id,
            reviewer_id,
            domain,
            object_id,
            trigger,
            object_type,
        })
    }
}

/// Validates a whole batch, failing on the first bad element.
pub fn new_reviews(reqs: &[proto::ReviewReq]) -> Result<Vec<NewReview>> {
    if reqs.is_empty() {
        return Err(ReviewError::invalid("infos is empty"));
    }
    reqs.iter()
        .enumerate()
        .map(|(index, req)| {
            NewReview::try_from(req).map_err(|err| match err {
                ReviewError::InvalidArgument(msg) => {
                    ReviewError::invalid(format!("infos[{}]: {}", index, msg))
                }
                other => other,
            })
        })
        .collect()
}

/// Requested change to an existing review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub id: Uuid,
    pub state: Option<ReviewState>,
    pub message: Option<String>,
}

impl ReviewUpdate {
    /// Values the record will hold after the update, or an error when the
    /// result would be rejected without an explanation.
    pub fn apply(&self, current: &reviews::Model) -> Result<(ReviewState, String)> {
        let state = self.state.unwrap_or(current.state);
        let message = self.message.clone().unwrap_or_else(|| current.message.clone());
        check_rejection(state, &message)?;
        Ok((state, message))
    }
}

impl TryFrom<&proto::ReviewReq> for ReviewUpdate {
    type Error = ReviewError;

    fn try_from(req: &proto::ReviewReq) -> Result<Self> {
        let id = required_uuid("id", req.id.as_ref())?;
        let state = req.state.map(ReviewState::from_wire).transpose()?;
        let update = Self {
            id,
            state,
            message: req.message.clone(),
        };
        if let Some(state) = update.state {
            check_rejection(state, update.message.as_deref().unwrap_or_default())?;
        }
        Ok(update)
    }
}

fn check_rejection(state: ReviewState, message: &str) -> Result<()> {
    if state == ReviewState::Rejected && message.is_empty() {
        return Err(ReviewError::invalid("invalid message: required when rejecting"));
    }
    Ok(())
}
