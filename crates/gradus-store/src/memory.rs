//! Canonical in-memory representation of knowledge and recipe state.
//!
//! This is the memory boundary for `gradus-store`:
//! - load/save the JSONL files of a store directory
//! - expose deterministic, id-ordered queries
//! - run the kernel validator before any recipe write
//! - refuse to delete knowledge that a recipe still cites

use crate::jsonl::{JsonlError, read_records_from_path, write_records_to_path};
use crate::knowledge::{KnowledgeFilter, KnowledgeUnit};
use crate::layout::StoreLayout;
use crate::recipe::{Recipe, RecipeDraft, RecipeFilter, RecipePatch};
use chrono::Utc;
use gradus_kernel::{
    Category, CompositionError, CompositionValidator, KnowledgeId, KnowledgeLookup, Level,
    Placement, RecipeId, ValidationReport,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors raised while loading, querying or mutating the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Jsonl(#[from] JsonlError),

    #[error("knowledge point not found: {0}")]
    KnowledgeNotFound(KnowledgeId),

    #[error("recipe not found: {0}")]
    RecipeNotFound(RecipeId),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("nothing to update for recipe {0}")]
    EmptyUpdate(RecipeId),

    #[error("no {0} ids left to assign")]
    IdSpaceExhausted(&'static str),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(
        "knowledge point {id} is cited by recipe(s) {}; remove or edit them first",
        recipe_ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    KnowledgeReferenced {
        id: KnowledgeId,
        recipe_ids: Vec<RecipeId>,
    },
}

/// Result of re-validating one stored recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeAudit {
    pub recipe_id: RecipeId,
    pub report: ValidationReport,
}

impl RecipeAudit {
    pub fn is_valid(&self) -> bool {
        self.report.is_accepted()
    }
}

/// Highest ids ever assigned, persisted so a deleted id is never handed
/// out again. A recipe citing a removed unit must stay dangling rather
/// than silently pointing at a newer one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdWatermark {
    #[serde(default)]
    pub last_knowledge_id: Option<KnowledgeId>,
    #[serde(default)]
    pub last_recipe_id: Option<RecipeId>,
}

impl IdWatermark {
    /// Raise the marks to cover `other`.
    fn absorb(&mut self, other: IdWatermark) {
        self.last_knowledge_id = self.last_knowledge_id.max(other.last_knowledge_id);
        self.last_recipe_id = self.last_recipe_id.max(other.last_recipe_id);
    }
}

/// Canonical in-memory state for knowledge units and recipes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    knowledge: BTreeMap<KnowledgeId, KnowledgeUnit>,
    recipes: BTreeMap<RecipeId, Recipe>,
    watermark: IdWatermark,
}

impl MemoryStore {
    /// Build a store from fully-materialized records.
    ///
    /// Duplicate ids are resolved with deterministic last-write-wins
    /// semantics, matching append-style edits of the JSONL files.
    pub fn from_records(units: Vec<KnowledgeUnit>, recipes: Vec<Recipe>) -> Self {
        let knowledge: BTreeMap<KnowledgeId, KnowledgeUnit> =
            units.into_iter().map(|u| (u.id, u)).collect();
        let recipes: BTreeMap<RecipeId, Recipe> = recipes.into_iter().map(|r| (r.id, r)).collect();
        let watermark = IdWatermark {
            last_knowledge_id: knowledge.keys().next_back().copied(),
            last_recipe_id: recipes.keys().next_back().copied(),
        };
        Self {
            knowledge,
            recipes,
            watermark,
        }
    }

    /// Load store state from a store directory.
    pub fn load(layout: &StoreLayout) -> Result<Self, StoreError> {
        let units = read_records_from_path(layout.knowledge_path())?;
        let recipes = read_records_from_path(layout.recipes_path())?;
        let marks: Vec<IdWatermark> = read_records_from_path(layout.sequence_path())?;
        let mut store = Self::from_records(units, recipes);
        for mark in marks {
            store.watermark.absorb(mark);
        }
        tracing::debug!(
            root = %layout.root().display(),
            knowledge = store.knowledge.len(),
            recipes = store.recipes.len(),
            "loaded store"
        );
        Ok(store)
    }

    /// Persist store state to a store directory.
    pub fn save(&self, layout: &StoreLayout) -> Result<(), StoreError> {
        let units: Vec<&KnowledgeUnit> = self.knowledge.values().collect();
        let recipes: Vec<&Recipe> = self.recipes.values().collect();
        write_records_to_path(layout.knowledge_path(), &units)?;
        write_records_to_path(layout.recipes_path(), &recipes)?;
        write_records_to_path(layout.sequence_path(), &[self.watermark])?;
        tracing::debug!(root = %layout.root().display(), "saved store");
        Ok(())
    }

    pub fn knowledge_len(&self) -> usize {
        self.knowledge.len()
    }

    pub fn recipe_len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knowledge.is_empty() && self.recipes.is_empty()
    }

    pub fn watermark(&self) -> IdWatermark {
        self.watermark
    }

    // ── Knowledge ──

    pub fn knowledge(&self, id: KnowledgeId) -> Option<&KnowledgeUnit> {
        self.knowledge.get(&id)
    }

    /// Knowledge units matching `filter`, in id order.
    pub fn knowledge_units(
        &self,
        filter: KnowledgeFilter,
    ) -> impl Iterator<Item = &KnowledgeUnit> + '_ {
        self.knowledge.values().filter(move |u| filter.matches(u))
    }

    /// The id the next knowledge unit will get. Never one seen before.
    pub fn next_knowledge_id(&self) -> Result<KnowledgeId, StoreError> {
        match self.watermark.last_knowledge_id {
            None => Ok(KnowledgeId::first()),
            Some(last) => last.next().ok_or(StoreError::IdSpaceExhausted("knowledge")),
        }
    }

    /// Create a knowledge unit with the next free id.
    pub fn add_knowledge(
        &mut self,
        content: &str,
        level: Level,
        category: Category,
        source: Option<String>,
    ) -> Result<KnowledgeUnit, StoreError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StoreError::EmptyField("content"));
        }

        let mut unit = KnowledgeUnit::new(self.next_knowledge_id()?, content, level, category);
        if let Some(source) = source.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            unit = unit.with_source(source);
        }
        self.watermark.last_knowledge_id = Some(unit.id);
        self.knowledge.insert(unit.id, unit.clone());
        tracing::info!(id = %unit.id, level = %level, category = %category, "added knowledge point");
        Ok(unit)
    }

    /// Recipes that cite `id`, in id order.
    pub fn recipes_citing(&self, id: KnowledgeId) -> Vec<RecipeId> {
        self.recipes
            .values()
            .filter(|r| r.cites(id))
            .map(|r| r.id)
            .collect()
    }

    /// Delete a knowledge unit.
    ///
    /// Refused while any recipe cites the unit, unless `force` is set. A
    /// forced delete leaves dangling references for [`Self::audit`] to find.
    pub fn remove_knowledge(
        &mut self,
        id: KnowledgeId,
        force: bool,
    ) -> Result<KnowledgeUnit, StoreError> {
        if !self.knowledge.contains_key(&id) {
            return Err(StoreError::KnowledgeNotFound(id));
        }

        let citing = self.recipes_citing(id);
        if !citing.is_empty() {
            if !force {
                tracing::warn!(%id, recipes = ?citing, "refused to remove cited knowledge point");
                return Err(StoreError::KnowledgeReferenced {
                    id,
                    recipe_ids: citing,
                });
            }
            tracing::warn!(%id, recipes = ?citing, "force-removing cited knowledge point");
        }

        let removed = self
            .knowledge
            .remove(&id)
            .ok_or(StoreError::KnowledgeNotFound(id))?;
        tracing::info!(%id, "removed knowledge point");
        Ok(removed)
    }

    // ── Recipes ──

    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(&id)
    }

    /// Recipes matching `filter`, in id order.
    pub fn recipes(&self, filter: RecipeFilter) -> impl Iterator<Item = &Recipe> + '_ {
        self.recipes.values().filter(move |r| filter.matches(r))
    }

    /// The id the next recipe will get. Never one seen before.
    pub fn next_recipe_id(&self) -> Result<RecipeId, StoreError> {
        match self.watermark.last_recipe_id {
            None => Ok(RecipeId::first()),
            Some(last) => last.next().ok_or(StoreError::IdSpaceExhausted("recipe")),
        }
    }

    /// Validate and create a recipe.
    ///
    /// Nothing is inserted unless every reference exists and is usable at
    /// the draft's level.
    pub fn add_recipe(
        &mut self,
        validator: &CompositionValidator,
        draft: RecipeDraft,
    ) -> Result<Recipe, StoreError> {
        let procedure = non_empty("procedure", &draft.procedure)?;
        let description = non_empty("description", &draft.description)?;
        validator.check(&*self, draft.level, &draft.knowledge_point_ids)?;

        let now = Utc::now();
        let recipe = Recipe {
            id: self.next_recipe_id()?,
            knowledge_point_ids: draft.knowledge_point_ids,
            level: draft.level,
            procedure,
            description,
            created_at: now,
            updated_at: now,
        };
        self.watermark.last_recipe_id = Some(recipe.id);
        self.recipes.insert(recipe.id, recipe.clone());
        tracing::info!(
            id = %recipe.id,
            level = %recipe.level,
            references = recipe.knowledge_point_ids.len(),
            "added recipe"
        );
        Ok(recipe)
    }

    /// Apply a partial update to a recipe.
    ///
    /// Any change to the level or the references re-runs the validator on
    /// the resulting recipe; on rejection the stored recipe is unchanged.
    pub fn update_recipe(
        &mut self,
        validator: &CompositionValidator,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::EmptyUpdate(id));
        }

        let mut next = self
            .recipes
            .get(&id)
            .cloned()
            .ok_or(StoreError::RecipeNotFound(id))?;

        let revalidate = patch.touches_references();
        if let Some(ids) = patch.knowledge_point_ids {
            next.knowledge_point_ids = ids;
        }
        if let Some(level) = patch.level {
            next.level = level;
        }
        if let Some(procedure) = patch.procedure {
            next.procedure = non_empty("procedure", &procedure)?;
        }
        if let Some(description) = patch.description {
            next.description = non_empty("description", &description)?;
        }

        if revalidate {
            validator.check(&*self, next.level, &next.knowledge_point_ids)?;
        }

        next.touch_updated_at();
        self.recipes.insert(id, next.clone());
        tracing::info!(%id, revalidated = revalidate, "updated recipe");
        Ok(next)
    }

    pub fn remove_recipe(&mut self, id: RecipeId) -> Result<Recipe, StoreError> {
        let removed = self
            .recipes
            .remove(&id)
            .ok_or(StoreError::RecipeNotFound(id))?;
        tracing::info!(%id, "removed recipe");
        Ok(removed)
    }

    /// Re-validate every stored recipe against current knowledge.
    ///
    /// Recipes are only validated when written; this finds the ones a
    /// forced knowledge delete has since left dangling.
    pub fn audit(&self, validator: &CompositionValidator) -> Vec<RecipeAudit> {
        self.recipes
            .values()
            .map(|recipe| RecipeAudit {
                recipe_id: recipe.id,
                report: validator.validate(self, recipe.level, &recipe.knowledge_point_ids),
            })
            .collect()
    }
}

impl KnowledgeLookup for MemoryStore {
    fn lookup_knowledge(&self, id: KnowledgeId) -> Option<Placement> {
        self.knowledge.get(&id).map(KnowledgeUnit::placement)
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}
