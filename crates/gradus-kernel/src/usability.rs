//! The single-hop usability rule.
//!
//! A knowledge unit is authored at one level with one category. Viewed
//! from another level it may still be usable, with its category flipped:
//!
//! ```text
//!   level L-1  (coarser)   form@L    is usable here as material
//!   level L    (own)       any unit  is usable unchanged
//!   level L+1  (finer)     material@L is usable here as form
//! ```
//!
//! A rule demoted one level becomes an instantiated fact of the coarser
//! scope; a concrete fact viewed one level finer becomes the form that
//! governs it. Flips never chain: anything two or more hops away is
//! unusable regardless of category.

use crate::category::{Category, Placement};
use crate::error::PreviewError;
use crate::id::KnowledgeId;
use crate::level::{Level, LevelScale};
use crate::lookup::KnowledgeLookup;
use serde::{Deserialize, Serialize};

/// How a target level relates to a unit's own level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Target is the unit's own level.
    Same,
    /// Target is one rank coarser than the unit.
    Coarser,
    /// Target is one rank finer than the unit.
    Finer,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Same => "same",
            Self::Coarser => "coarser",
            Self::Finer => "finer",
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a unit cannot be cited at a target level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnusableReason {
    /// Material never moves one level coarser.
    MaterialCannotAscend,
    /// Form never moves one level finer.
    FormCannotDescend,
    /// Target is two or more ranks away.
    TooDistant { hops: usize },
    /// The unit's level or the target is not on the scale in use.
    OffScale,
}

impl std::fmt::Display for UnusableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MaterialCannotAscend => {
                write!(f, "material cannot be used one level coarser")
            }
            Self::FormCannotDescend => write!(f, "form cannot be used one level finer"),
            Self::TooDistant { hops } => {
                write!(f, "target level is {hops} levels away (at most one allowed)")
            }
            Self::OffScale => write!(f, "level is not on the active scale"),
        }
    }
}

/// Outcome of resolving one unit against one target level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Usability {
    Usable {
        relation: Relation,
        effective: Category,
    },
    Unusable {
        reason: UnusableReason,
    },
}

impl Usability {
    /// The effective category, if usable.
    pub fn effective(self) -> Option<Category> {
        match self {
            Self::Usable { effective, .. } => Some(effective),
            Self::Unusable { .. } => None,
        }
    }

    pub fn is_usable(self) -> bool {
        matches!(self, Self::Usable { .. })
    }

    fn unusable(reason: UnusableReason) -> Self {
        Self::Unusable { reason }
    }
}

/// Computes effective categories over an injected level scale.
#[derive(Debug, Clone, Default)]
pub struct UsabilityResolver {
    scale: LevelScale,
}

impl UsabilityResolver {
    pub fn new(scale: LevelScale) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> &LevelScale {
        &self.scale
    }

    /// Resolve `placement` against `target`.
    pub fn resolve(&self, placement: Placement, target: Level) -> Usability {
        if target == placement.level {
            return Usability::Usable {
                relation: Relation::Same,
                effective: placement.category,
            };
        }

        if self.scale.parent(placement.level) == Some(target) {
            return match placement.category {
                Category::Form => Usability::Usable {
                    relation: Relation::Coarser,
                    effective: Category::Material,
                },
                Category::Material => Usability::unusable(UnusableReason::MaterialCannotAscend),
            };
        }

        if self.scale.child(placement.level) == Some(target) {
            return match placement.category {
                Category::Material => Usability::Usable {
                    relation: Relation::Finer,
                    effective: Category::Form,
                },
                Category::Form => Usability::unusable(UnusableReason::FormCannotDescend),
            };
        }

        match self.scale.distance(placement.level, target) {
            Some(hops) => Usability::unusable(UnusableReason::TooDistant { hops }),
            None => Usability::unusable(UnusableReason::OffScale),
        }
    }

    /// Every level at which `placement` is usable, coarse to fine.
    pub fn usable_levels(&self, placement: Placement) -> Vec<(Level, Category)> {
        self.scale
            .levels()
            .filter_map(|level| {
                self.resolve(placement, level)
                    .effective()
                    .map(|effective| (level, effective))
            })
            .collect()
    }
}

/// Answer to "may this unit be cited at that level, and as what?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsabilityPreview {
    pub unit_id: KnowledgeId,
    pub source_level: Level,
    pub source_category: Category,
    pub target_level: Level,
    pub effective_category: Category,
    pub relation: Relation,
}

/// Preview whether one stored unit may be cited at `target`.
pub fn resolve_usability<L: KnowledgeLookup + ?Sized>(
    resolver: &UsabilityResolver,
    lookup: &L,
    unit_id: KnowledgeId,
    target: Level,
) -> Result<UsabilityPreview, PreviewError> {
    let placement = lookup
        .lookup_knowledge(unit_id)
        .ok_or(PreviewError::NotFound(unit_id))?;

    match resolver.resolve(placement, target) {
        Usability::Usable {
            relation,
            effective,
        } => Ok(UsabilityPreview {
            unit_id,
            source_level: placement.level,
            source_category: placement.category,
            target_level: target,
            effective_category: effective,
            relation,
        }),
        Usability::Unusable { reason } => Err(PreviewError::NotUsable {
            id: unit_id,
            level: target,
            reason,
        }),
    }
}
