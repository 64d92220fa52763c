//! # Gradus Kernel
//!
//! Knowledge units are authored at one level of a fixed scale, as either
//! *form* (an organizing rule) or *material* (an organized instance).
//! Recipes cite units from a single target level. This crate decides which
//! citations are legal and what role each unit plays at the recipe's level.
//!
//! ## Architecture
//!
//! ```text
//! LevelScale            ← Ordered ranks: collection > work > section > motif > timbre
//!     │
//! UsabilityResolver     ← Single-hop rule: (level, category) × target → effective category
//!     │
//! CompositionValidator  ← Reference set × target → accepted | missing / unusable ids
//!     │
//! KnowledgeLookup       ← Collaborator trait, implemented by the store
//! ```
//!
//! Nothing here performs I/O or keeps state between calls.

pub mod category;
pub mod composition;
pub mod error;
pub mod id;
pub mod level;
pub mod lookup;
pub mod usability;

pub use category::{Category, Placement};
pub use composition::{
    CompositionValidator, ResolvedReference, UnusableReference, ValidationReport,
};
pub use error::{CompositionError, InputError, PreviewError};
pub use id::{KnowledgeId, RecipeId};
pub use level::{Level, LevelScale};
pub use lookup::KnowledgeLookup;
pub use usability::{
    Relation, UnusableReason, Usability, UsabilityPreview, UsabilityResolver, resolve_usability,
};
