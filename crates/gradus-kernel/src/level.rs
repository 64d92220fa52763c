//! Discrete levels and the scale that orders them.
//!
//! Every knowledge unit and every recipe is declared at one level. The
//! standard scale has five ranks, coarsest to finest:
//!
//! - **Collection**: a body of works taken together
//! - **Work**: one complete piece
//! - **Section**: a formal part of a work
//! - **Motif**: a short recognizable figure
//! - **Timbre**: the sound of a single event
//!
//! The ordering is data, not a global: callers hold a [`LevelScale`] and
//! pass it to whatever needs to compare levels.

use crate::error::InputError;
use serde::{Deserialize, Serialize};

/// A level of discussion.
///
/// Variant order matches the standard scale (coarse to fine), so the
/// derived `Ord` agrees with [`LevelScale::standard`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Collection,
    Work,
    Section,
    Motif,
    Timbre,
}

impl Level {
    /// All levels in standard order.
    pub const ALL: [Level; 5] = [
        Level::Collection,
        Level::Work,
        Level::Section,
        Level::Motif,
        Level::Timbre,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Work => "work",
            Self::Section => "section",
            Self::Motif => "motif",
            Self::Timbre => "timbre",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "collection" => Ok(Self::Collection),
            "work" => Ok(Self::Work),
            "section" => Ok(Self::Section),
            "motif" => Ok(Self::Motif),
            "timbre" => Ok(Self::Timbre),
            _ => Err(InputError::UnknownLevel(s.to_string())),
        }
    }
}

/// A totally ordered sequence of distinct levels, coarsest first.
///
/// The scale is immutable once built. Rank 0 is the coarsest level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelScale {
    ranks: Vec<Level>,
}

impl LevelScale {
    /// The five-rank scale: collection > work > section > motif > timbre.
    pub fn standard() -> Self {
        Self {
            ranks: Level::ALL.to_vec(),
        }
    }

    /// Build a scale from an explicit coarse-to-fine ordering.
    ///
    /// Rejects an empty ordering and any level listed twice.
    pub fn new(ranks: Vec<Level>) -> Result<Self, InputError> {
        if ranks.is_empty() {
            return Err(InputError::InvalidScale(
                "a level scale needs at least one rank".to_string(),
            ));
        }
        for (i, level) in ranks.iter().enumerate() {
            if ranks[..i].contains(level) {
                return Err(InputError::InvalidScale(format!(
                    "level `{level}` appears more than once"
                )));
            }
        }
        Ok(Self { ranks })
    }

    /// Rank of `level`, 0 = coarsest. `None` if the scale omits it.
    pub fn index(&self, level: Level) -> Option<usize> {
        self.ranks.iter().position(|l| *l == level)
    }

    /// The next coarser level, if any.
    pub fn parent(&self, level: Level) -> Option<Level> {
        let idx = self.index(level)?;
        idx.checked_sub(1).map(|p| self.ranks[p])
    }

    /// The next finer level, if any.
    pub fn child(&self, level: Level) -> Option<Level> {
        let idx = self.index(level)?;
        self.ranks.get(idx + 1).copied()
    }

    /// Number of hops between two levels on this scale.
    pub fn distance(&self, a: Level, b: Level) -> Option<usize> {
        Some(self.index(a)?.abs_diff(self.index(b)?))
    }

    pub fn contains(&self, level: Level) -> bool {
        self.index(level).is_some()
    }

    /// Levels coarse to fine.
    pub fn levels(&self) -> impl Iterator<Item = Level> + '_ {
        self.ranks.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn coarsest(&self) -> Level {
        self.ranks[0]
    }

    pub fn finest(&self) -> Level {
        self.ranks[self.ranks.len() - 1]
    }
}

impl Default for LevelScale {
    fn default() -> Self {
        Self::standard()
    }
}
