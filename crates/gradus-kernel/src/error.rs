//! Error types for kernel operations.

use crate::id::KnowledgeId;
use crate::level::Level;
use crate::usability::UnusableReason;

/// Malformed input, rejected before any rule is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown level: {0} (expected collection, work, section, motif or timbre)")]
    UnknownLevel(String),

    #[error("unknown category: {0} (expected form or material)")]
    UnknownCategory(String),

    /// Ids are positive integers.
    #[error("invalid id: {0:?} (expected a positive integer)")]
    InvalidId(String),

    #[error("invalid level scale: {0}")]
    InvalidScale(String),
}

/// Why a recipe's reference set was rejected.
///
/// Missing references take precedence over unusable ones: usability is
/// meaningless for a unit that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    #[error("a recipe must reference at least one knowledge point")]
    EmptyReferences,

    #[error("missing knowledge points: {}", join_ids(ids))]
    MissingKnowledge { ids: Vec<KnowledgeId> },

    #[error("knowledge points not usable at level {level}: {}", join_ids(ids))]
    UnusableAtLevel { level: Level, ids: Vec<KnowledgeId> },
}

impl CompositionError {
    /// Stable machine-readable class for this rejection.
    pub fn class(&self) -> &'static str {
        match self {
            Self::EmptyReferences => "empty_references",
            Self::MissingKnowledge { .. } => "missing_knowledge",
            Self::UnusableAtLevel { .. } => "unusable_at_level",
        }
    }
}

/// Failure of a single-unit usability preview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    #[error("knowledge point not found: {0}")]
    NotFound(KnowledgeId),

    #[error("knowledge point {id} is not usable at level {level}: {reason}")]
    NotUsable {
        id: KnowledgeId,
        level: Level,
        reason: UnusableReason,
    },
}

fn join_ids(ids: &[KnowledgeId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_error_names_ids() {
        let err = CompositionError::MissingKnowledge {
            ids: vec![KnowledgeId::new(9).unwrap(), KnowledgeId::new(11).unwrap()],
        };
        assert_eq!(err.to_string(), "missing knowledge points: 9, 11");
        assert_eq!(err.class(), "missing_knowledge");

        let err = CompositionError::UnusableAtLevel {
            level: Level::Motif,
            ids: vec![KnowledgeId::new(3).unwrap()],
        };
        assert_eq!(
            err.to_string(),
            "knowledge points not usable at level motif: 3"
        );
    }
}
