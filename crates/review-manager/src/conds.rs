//! Condition sets and their translation into query filters
//!
//! A [`Conds`] maps each filterable review field to an operator and a typed
//! value. Values are validated when they enter the set, so compiling a set
//! into a sea-orm [`Condition`] cannot fail. Every compiled filter excludes
//! soft deleted rows and binds values as statement parameters.

use std::collections::BTreeMap;
use std::fmt;

use sea_orm::sea_query::SimpleExpr;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Select, Value};
use uuid::Uuid;

use crate::entity::reviews;
use crate::error::{Result, ReviewError};
use crate::proto;
use crate::types::{ObjectType, ReviewState, Trigger};
use crate::validate::parse_uuid;

/// Comparison operator. Only equality is supported today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
}

impl Op {
    /// Wire spelling of the operator
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
        }
    }

    fn parse(field: Field, op: &str) -> Result<Self> {
        match op {
            "eq" => Ok(Self::Eq),
            other => Err(ReviewError::invalid(format!(
                "invalid review field: {} does not support op '{}'",
                field, other
            ))),
        }
    }
}

/// Filterable review fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Id,
    AppId,
    ReviewerId,
    Domain,
    ObjectId,
    Trigger,
    ObjectType,
    State,
}

impl Field {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::AppId => "app_id",
            Self::ReviewerId => "reviewer_id",
            Self::Domain => "domain",
            Self::ObjectId => "object_id",
            Self::Trigger => "trigger",
            Self::ObjectType => "object_type",
            Self::State => "state",
        }
    }

    const fn column(self) -> reviews::Column {
        match self {
            Self::Id => reviews::Column::Id,
            Self::AppId => reviews::Column::AppId,
            Self::ReviewerId => reviews::Column::ReviewerId,
            Self::Domain => reviews::Column::Domain,
            Self::ObjectId => reviews::Column::ObjectId,
            Self::Trigger => reviews::Column::Trigger,
            Self::ObjectType => reviews::Column::ObjectType,
            Self::State => reviews::Column::State,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed value carried by a field condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CondValue {
    Id(Uuid),
    Text(String),
    Trigger(Trigger),
    ObjectType(ObjectType),
    State(ReviewState),
}

impl CondValue {
    fn fits(&self, field: Field) -> bool {
        matches!(
            (field, self),
            (Field::Id | Field::AppId | Field::ReviewerId | Field::ObjectId, Self::Id(_))
                | (Field::Domain, Self::Text(_))
                | (Field::Trigger, Self::Trigger(_))
                | (Field::ObjectType, Self::ObjectType(_))
                | (Field::State, Self::State(_))
        )
    }
}

impl From<Uuid> for CondValue {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for CondValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for CondValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Trigger> for CondValue {
    fn from(trigger: Trigger) -> Self {
        Self::Trigger(trigger)
    }
}

impl From<ObjectType> for CondValue {
    fn from(object_type: ObjectType) -> Self {
        Self::ObjectType(object_type)
    }
}

impl From<ReviewState> for CondValue {
    fn from(state: ReviewState) -> Self {
        Self::State(state)
    }
}

impl From<CondValue> for Value {
    fn from(value: CondValue) -> Self {
        match value {
            CondValue::Id(id) => id.into(),
            CondValue::Text(text) => text.into(),
            CondValue::Trigger(trigger) => trigger.name().into(),
            CondValue::ObjectType(object_type) => object_type.name().into(),
            CondValue::State(state) => state.name().into(),
        }
    }
}

/// Operator and value for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCond {
    pub op: Op,
    pub value: CondValue,
}

impl FieldCond {
    fn expr(&self, field: Field) -> SimpleExpr {
        match self.op {
            Op::Eq => field.column().eq(self.value.clone()),
        }
    }
}

/// Validated condition set. Absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conds {
    fields: BTreeMap<Field, FieldCond>,
}

impl Conds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the condition on `field`.
    pub fn set(&mut self, field: Field, op: Op, value: CondValue) -> Result<()> {
        if !value.fits(field) {
            return Err(ReviewError::invalid(format!(
                "invalid review field: {} cannot hold {:?}",
                field, value
            )));
        }
        if matches!(&value, CondValue::Text(text) if text.is_empty()) {
            return Err(ReviewError::invalid(format!("invalid {}", field)));
        }
        self.fields.insert(field, FieldCond { op, value });
        Ok(())
    }

    /// Builder form of [`Conds::set`] with the equality operator.
    pub fn eq(mut self, field: Field, value: impl Into<CondValue>) -> Result<Self> {
        self.set(field, Op::Eq, value.into())?;
        Ok(self)
    }

    pub fn get(&self, field: Field) -> Option<&FieldCond> {
        self.fields.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldCond)> {
        self.fields.iter().map(|(field, cond)| (*field, cond))
    }

    /// Conjunction of every field condition over live rows.
    pub fn condition(&self) -> Condition {
        self.fields.iter().fold(
            Condition::all().add(reviews::Column::DeletedAt.is_null()),
            |condition, (field, cond)| condition.add(cond.expr(*field)),
        )
    }

    /// Select over the reviews table filtered by this set.
    pub fn select(&self) -> Select<reviews::Entity> {
        reviews::Entity::find().filter(self.condition())
    }
}

impl TryFrom<&proto::Conds> for Conds {
    type Error = ReviewError;

    fn try_from(conds: &proto::Conds) -> Result<Self> {
        let mut out = Conds::new();

        let strings = [
            (Field::Id, conds.id.as_ref()),
            (Field::AppId, conds.app_id.as_ref()),
            (Field::ReviewerId, conds.reviewer_id.as_ref()),
            (Field::Domain, conds.domain.as_ref()),
            (Field::ObjectId, conds.object_id.as_ref()),
        ];
        for (field, val) in strings {
            let Some(val) = val else { continue };
            let op = Op::parse(field, &val.op)?;
            let value = match field {
                Field::Domain => CondValue::Text(val.value.clone()),
                _ => CondValue::Id(parse_uuid(field.name(), &val.value)?),
            };
            out.set(field, op, value)?;
        }

        let enums = [
            (Field::Trigger, conds.trigger.as_ref()),
            (Field::ObjectType, conds.object_type.as_ref()),
            (Field::State, conds.state.as_ref()),
        ];
        for (field, val) in enums {
            let Some(val) = val else { continue };
            let op = Op::parse(field, &val.op)?;
            let wire = i32::try_from(val.value)
                .map_err(|_| ReviewError::invalid(format!("invalid {}: {}", field, val.value)))?;
            let value = match field {
                Field::Trigger => CondValue::Trigger(Trigger::from_wire(wire)?),
                Field::ObjectType => CondValue::ObjectType(ObjectType::from_wire(wire)?),
                _ => CondValue::State(ReviewState::from_wire(wire)?),
            };
            out.set(field, op, value)?;
        }

        Ok(out)
    }
}

impl TryFrom<Option<&proto::Conds>> for Conds {
    type Error = ReviewError;

    fn try_from(conds: Option<&proto::Conds>) -> Result<Self> {
        conds.map_or_else(|| Ok(Conds::new()), Conds::try_from)
    }
}
