//! Recipe record: knowledge units composed into a procedure at one level.

use chrono::{DateTime, Utc};
use gradus_kernel::{KnowledgeId, Level, RecipeId};
use serde::{Deserialize, Serialize};

/// A stored recipe.
///
/// `knowledge_point_ids` is kept exactly as submitted (order and
/// duplicates). The effective categories computed at validation time are
/// not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub knowledge_point_ids: Vec<KnowledgeId>,
    pub level: Level,
    pub procedure: String,
    pub description: String,

    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_timestamp")]
    pub updated_at: DateTime<Utc>,
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

impl Recipe {
    pub fn cites(&self, id: KnowledgeId) -> bool {
        self.knowledge_point_ids.contains(&id)
    }

    pub fn touch_updated_at(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Input for creating a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub knowledge_point_ids: Vec<KnowledgeId>,
    pub level: Level,
    pub procedure: String,
    pub description: String,
}

/// Partial update to a recipe. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipePatch {
    pub knowledge_point_ids: Option<Vec<KnowledgeId>>,
    pub level: Option<Level>,
    pub procedure: Option<String>,
    pub description: Option<String>,
}

impl RecipePatch {
    /// Whether applying this patch requires re-validating references.
    pub fn touches_references(&self) -> bool {
        self.knowledge_point_ids.is_some() || self.level.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.knowledge_point_ids.is_none()
            && self.level.is_none()
            && self.procedure.is_none()
            && self.description.is_none()
    }
}

/// Filter for listing recipes. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub level: Option<Level>,
    pub uses: Option<KnowledgeId>,
}

impl RecipeFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.level.is_none_or(|l| recipe.level == l) && self.uses.is_none_or(|id| recipe.cites(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_touches_references_only_for_ids_or_level() {
        assert!(!RecipePatch::default().touches_references());
        assert!(
            !RecipePatch {
                procedure: Some("Repeat twice".to_string()),
                ..Default::default()
            }
            .touches_references()
        );
        assert!(
            RecipePatch {
                level: Some(Level::Work),
                ..Default::default()
            }
            .touches_references()
        );
    }

    #[test]
    fn recipe_parses_camel_case_line() {
        let line = r#"{"id":2,"knowledgePointIds":[5,5,7],"level":"motif","procedure":"p","description":"d"}"#;
        let recipe: Recipe = serde_json::from_str(line).expect("should parse");
        assert_eq!(recipe.knowledge_point_ids.len(), 3);
        assert!(recipe.cites(KnowledgeId::new(7).unwrap()));
    }
}
