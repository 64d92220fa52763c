//! Recipe reference validation.
//!
//! A recipe cites knowledge units by id and declares one target level.
//! Before a recipe is created, or updated in a way that touches its level
//! or its references, the whole reference set is checked:
//!
//! 1. the set must be non-empty;
//! 2. every id must name an existing unit;
//! 3. every existing unit must be usable at the target level.
//!
//! All ids are checked, so a rejection names every offender rather than
//! the first one.

use crate::category::{Category, Placement};
use crate::error::CompositionError;
use crate::id::KnowledgeId;
use crate::level::{Level, LevelScale};
use crate::lookup::KnowledgeLookup;
use crate::usability::{Relation, UnusableReason, Usability, UsabilityResolver};
use serde::{Deserialize, Serialize};

/// A reference that resolved and is usable at the target level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedReference {
    pub id: KnowledgeId,
    pub placement: Placement,
    pub relation: Relation,
    pub effective_category: Category,
}

/// A reference that resolved but cannot be cited at the target level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusableReference {
    pub id: KnowledgeId,
    pub placement: Placement,
    pub reason: UnusableReason,
}

/// Full outcome of checking one reference set.
///
/// `accepted` follows the input order, one entry per input position.
/// `missing_ids` and `unusable` list each offending id once, in order of
/// first appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub target_level: Level,
    pub requested: usize,
    pub accepted: Vec<ResolvedReference>,
    pub missing_ids: Vec<KnowledgeId>,
    pub unusable: Vec<UnusableReference>,
}

impl ValidationReport {
    pub fn is_accepted(&self) -> bool {
        self.requested > 0 && self.missing_ids.is_empty() && self.unusable.is_empty()
    }

    pub fn unusable_ids(&self) -> Vec<KnowledgeId> {
        self.unusable.iter().map(|u| u.id).collect()
    }

    /// Collapse the report into accept/reject, missing before unusable.
    pub fn into_result(self) -> Result<Vec<ResolvedReference>, CompositionError> {
        if self.requested == 0 {
            return Err(CompositionError::EmptyReferences);
        }
        if !self.missing_ids.is_empty() {
            return Err(CompositionError::MissingKnowledge {
                ids: self.missing_ids,
            });
        }
        if !self.unusable.is_empty() {
            return Err(CompositionError::UnusableAtLevel {
                level: self.target_level,
                ids: self.unusable.iter().map(|u| u.id).collect(),
            });
        }
        Ok(self.accepted)
    }
}

/// Checks recipe reference sets against a knowledge lookup.
#[derive(Debug, Clone, Default)]
pub struct CompositionValidator {
    resolver: UsabilityResolver,
}

impl CompositionValidator {
    pub fn new(resolver: UsabilityResolver) -> Self {
        Self { resolver }
    }

    pub fn with_scale(scale: LevelScale) -> Self {
        Self::new(UsabilityResolver::new(scale))
    }

    pub fn resolver(&self) -> &UsabilityResolver {
        &self.resolver
    }

    /// Check every id and report all findings.
    pub fn validate<L: KnowledgeLookup + ?Sized>(
        &self,
        lookup: &L,
        target: Level,
        ids: &[KnowledgeId],
    ) -> ValidationReport {
        let mut report = ValidationReport {
            target_level: target,
            requested: ids.len(),
            accepted: Vec::with_capacity(ids.len()),
            missing_ids: Vec::new(),
            unusable: Vec::new(),
        };

        for &id in ids {
            let Some(placement) = lookup.lookup_knowledge(id) else {
                if !report.missing_ids.contains(&id) {
                    report.missing_ids.push(id);
                }
                continue;
            };

            match self.resolver.resolve(placement, target) {
                Usability::Usable {
                    relation,
                    effective,
                } => report.accepted.push(ResolvedReference {
                    id,
                    placement,
                    relation,
                    effective_category: effective,
                }),
                Usability::Unusable { reason } => {
                    if !report.unusable.iter().any(|u| u.id == id) {
                        report.unusable.push(UnusableReference {
                            id,
                            placement,
                            reason,
                        });
                    }
                }
            }
        }

        report
    }

    /// Validate and collapse to accept/reject in one call.
    pub fn check<L: KnowledgeLookup + ?Sized>(
        &self,
        lookup: &L,
        target: Level,
        ids: &[KnowledgeId],
    ) -> Result<Vec<ResolvedReference>, CompositionError> {
        self.validate(lookup, target, ids).into_result()
    }
}
