//! The role a knowledge unit plays at its level.

use crate::error::InputError;
use crate::level::Level;
use serde::{Deserialize, Serialize};

/// Organizing rule versus organized material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// An organizing principle: a rule that shapes other things.
    Form,

    /// An organized object: an instance the rules act on.
    Material,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Form, Category::Material];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Material => "material",
        }
    }

    /// The opposite role.
    pub fn flipped(self) -> Self {
        match self {
            Self::Form => Self::Material,
            Self::Material => Self::Form,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "form" => Ok(Self::Form),
            "material" => Ok(Self::Material),
            _ => Err(InputError::UnknownCategory(s.to_string())),
        }
    }
}

/// Where a knowledge unit was authored: its level and its category there.
///
/// This is the only part of a knowledge unit the kernel ever reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub level: Level,
    pub category: Category,
}

impl Placement {
    pub fn new(level: Level, category: Category) -> Self {
        Self { level, category }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.level, self.category)
    }
}
