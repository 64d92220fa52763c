//! # gradus-store
//!
//! Storage layer for knowledge units and recipes.
//!
//! This crate provides:
//! - `KnowledgeUnit` and `Recipe` records
//! - JSONL read/write (portable persistence)
//! - `MemoryStore` (canonical in-memory state, implements `KnowledgeLookup`)
//! - lock-scoped atomic mutation of a store directory
//!
//! Usability rules live in `gradus-kernel`; this crate only calls them
//! before writing a recipe.
//!
//! ## Data model
//!
//! ```text
//! knowledge.jsonl + recipes.jsonl + sequence.jsonl (on disk, one record per line)
//!     ↕  load / save
//! MemoryStore (deterministic in-memory projection)
//! ```

pub mod atomic_store;
pub mod jsonl;
pub mod knowledge;
pub mod layout;
pub mod memory;
pub mod recipe;

pub use atomic_store::{AtomicStoreMutationError, mutate_store};
pub use jsonl::JsonlError;
pub use knowledge::{KnowledgeFilter, KnowledgeUnit};
pub use layout::{
    DEFAULT_STORE_DIR, KNOWLEDGE_FILE, LOCK_FILE, RECIPES_FILE, SEQUENCE_FILE, StoreLayout,
};
pub use memory::{IdWatermark, MemoryStore, RecipeAudit, StoreError};
pub use recipe::{Recipe, RecipeDraft, RecipeFilter, RecipePatch};
