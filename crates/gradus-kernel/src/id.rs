//! Record identifiers.
//!
//! Knowledge units and recipes are addressed by positive integers. Zero,
//! negative and non-integer tokens are malformed input and never reach
//! the resolver.

use crate::error::InputError;
use serde::{Deserialize, Serialize};

macro_rules! positive_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(try_from = "u64", into = "u64")]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw value. Zero is rejected.
            pub fn new(value: u64) -> Result<Self, InputError> {
                if value == 0 {
                    return Err(InputError::InvalidId("0".to_string()));
                }
                Ok(Self(value))
            }

            pub fn get(self) -> u64 {
                self.0
            }

            /// The id after this one, or `None` once the id space is used up.
            pub fn next(self) -> Option<Self> {
                self.0.checked_add(1).map(Self)
            }

            pub fn first() -> Self {
                Self(1)
            }
        }

        impl TryFrom<u64> for $name {
            type Error = InputError;

            fn try_from(value: u64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = InputError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value: u64 = s
                    .trim()
                    .parse()
                    .map_err(|_| InputError::InvalidId(s.to_string()))?;
                Self::new(value).map_err(|_| InputError::InvalidId(s.to_string()))
            }
        }
    };
}

positive_id! {
    /// Identifier of a knowledge unit.
    KnowledgeId
}

positive_id! {
    /// Identifier of a recipe.
    RecipeId
}
