//! Knowledge unit record.

use chrono::{DateTime, Utc};
use gradus_kernel::{Category, KnowledgeId, Level, Placement};
use serde::{Deserialize, Serialize};

/// An atomic, reusable statement tagged with a level and a category.
///
/// Units are never edited after creation: a correction is a new unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeUnit {
    pub id: KnowledgeId,
    pub content: String,
    pub level: Level,
    pub category: Category,

    /// Free-text provenance (score, treatise, page).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

impl KnowledgeUnit {
    pub fn new(
        id: KnowledgeId,
        content: impl Into<String>,
        level: Level,
        category: Category,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            level,
            category,
            source: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn placement(&self) -> Placement {
        Placement::new(self.level, self.category)
    }
}

/// Filter for listing knowledge units. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KnowledgeFilter {
    pub level: Option<Level>,
    pub category: Option<Category>,
}

impl KnowledgeFilter {
    pub fn matches(&self, unit: &KnowledgeUnit) -> bool {
        self.level.is_none_or(|l| unit.level == l)
            && self.category.is_none_or(|c| unit.category == c)
    }
}
