//! Review value types
//!
//! Each enum is persisted under its canonical string name and travels over
//! gRPC as the matching `review.manager.v1` enum symbol. Both mappings are
//! total for defined values; anything else is rejected instead of falling
//! back to a default.

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;

use crate::error::{Result, ReviewError};
use crate::proto;

/// Reason a review was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Trigger {
    #[sea_orm(string_value = "AutoReviewed")]
    AutoReviewed,
    #[sea_orm(string_value = "LargeAmount")]
    LargeAmount,
    #[sea_orm(string_value = "InsufficientFunds")]
    InsufficientFunds,
    #[sea_orm(string_value = "InsufficientGas")]
    InsufficientGas,
    #[sea_orm(string_value = "InsufficientFundsGas")]
    InsufficientFundsGas,
}

/// Kind of object under review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ObjectType {
    #[sea_orm(string_value = "ObjectKyc")]
    Kyc,
    #[sea_orm(string_value = "ObjectWithdrawal")]
    Withdrawal,
}

/// Review lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ReviewState {
    #[sea_orm(string_value = "Wait")]
    Wait,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
}

/// Implements the string and wire conversions shared by the review enums.
macro_rules! review_enum {
    ($ty:ident, $wire:ident, $label:literal, { $($variant:ident => $symbol:ident),+ $(,)? }) => {
        impl $ty {
            /// Canonical name stored in the database.
            pub fn name(&self) -> String {
                self.to_value()
            }

            /// Decodes a wire enum number.
            pub fn from_wire(value: i32) -> Result<Self> {
                let symbol = proto::$wire::try_from(value)
                    .map_err(|_| ReviewError::invalid(format!("invalid {}: {}", $label, value)))?;
                Self::try_from(symbol)
            }

            /// Encodes to the wire enum number.
            pub fn to_wire(self) -> i32 {
                proto::$wire::from(self) as i32
            }
        }

        impl TryFrom<proto::$wire> for $ty {
            type Error = ReviewError;

            fn try_from(symbol: proto::$wire) -> Result<Self> {
                match symbol {
                    $(proto::$wire::$symbol => Ok(Self::$variant),)+
                    other => Err(ReviewError::invalid(format!(
                        "invalid {}: {}",
                        $label,
                        other.as_str_name()
                    ))),
                }
            }
        }

        impl From<$ty> for proto::$wire {
            fn from(value: $ty) -> Self {
                match value {
                    $($ty::$variant => proto::$wire::$symbol,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = ReviewError;

            fn from_str(s: &str) -> Result<Self> {
                <$ty as ActiveEnum>::try_from_value(&s.to_string())
                    .map_err(|_| ReviewError::invalid(format!("invalid {}: {}", $label, s)))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.name())
            }
        }
    };
}

review_enum!(Trigger, ReviewTriggerType, "trigger", {
    AutoReviewed => AutoReviewed,
    LargeAmount => LargeAmount,
    InsufficientFunds => InsufficientFunds,
    InsufficientGas => InsufficientGas,
    InsufficientFundsGas => InsufficientFundsGas,
});

review_enum!(ObjectType, ReviewObjectType, "object type", {
    Kyc => Kyc,
    Withdrawal => Withdrawal,
});

review_enum!(ReviewState, ReviewState, "state", {
    Wait => Wait,
    Approved => Approved,
    Rejected => Rejected,
});

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_string_round_trip() {
        for trigger in Trigger::iter() {
            assert_eq!(trigger.name().parse::<Trigger>().unwrap(), trigger);
        }
        for object_type in ObjectType::iter() {
            assert_eq!(object_type.name().parse::<ObjectType>().unwrap(), object_type);
        }
        for state in ReviewState::iter() {
            assert_eq!(state.name().parse::<ReviewState>().unwrap(), state);
        }
    }

    #[test]
    fn test_wire_round_trip() {
        for trigger in Trigger::iter() {
            assert_eq!(Trigger::from_wire(trigger.to_wire()).unwrap(), trigger);
        }
        for object_type in ObjectType::iter() {
            assert_eq!(ObjectType::from_wire(object_type.to_wire()).unwrap(), object_type);
        }
        for state in ReviewState::iter() {
            assert_eq!(ReviewState::from_wire(state.to_wire()).unwrap(), state);
        }
    }

    #[test]
    fn test_stored_names() {
        assert_eq!(Trigger::InsufficientFundsGas.name(), "InsufficientFundsGas");
        assert_eq!(ObjectType::Kyc.name(), "ObjectKyc");
        assert_eq!(ObjectType::Withdrawal.to_string(), "ObjectWithdrawal");
        assert_eq!(ReviewState::Wait.to_string(), "Wait");
    }

    #[test]
    fn test_unknown_strings_rejected() {
        assert!("Pending".parse::<ReviewState>().is_err());
        assert!("wait".parse::<ReviewState>().is_err());
        assert!("".parse::<Trigger>().is_err());
        assert!("Kyc".parse::<ObjectType>().is_err());
    }

    #[test]
    fn test_unspecified_and_out_of_range_wire_values_rejected() {
        let err = ReviewState::from_wire(0).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("invalid state"));

        assert!(Trigger::from_wire(0).is_err());
        assert!(Trigger::from_wire(42).is_err());
        assert!(ObjectType::from_wire(-1).is_err());
        assert!(ReviewState::try_from(proto::ReviewState::Unspecified).is_err());
    }
}
