//! The one collaborator the kernel reads through.

use crate::category::Placement;
use crate::id::KnowledgeId;
use std::collections::{BTreeMap, HashMap};

/// Read access to knowledge units, supplied by the storage layer.
///
/// The kernel only needs a unit's placement; content, provenance and
/// timestamps stay with the store. Implementations must not assume the
/// kernel caches anything between calls.
pub trait KnowledgeLookup {
    /// Placement of the unit with this id, or `None` if it does not exist.
    fn lookup_knowledge(&self, id: KnowledgeId) -> Option<Placement>;
}

impl KnowledgeLookup for BTreeMap<KnowledgeId, Placement> {
    fn lookup_knowledge(&self, id: KnowledgeId) -> Option<Placement> {
        self.get(&id).copied()
    }
}

impl KnowledgeLookup for HashMap<KnowledgeId, Placement> {
    fn lookup_knowledge(&self, id: KnowledgeId) -> Option<Placement> {
        self.get(&id).copied()
    }
}

impl<T: KnowledgeLookup + ?Sized> KnowledgeLookup for &T {
    fn lookup_knowledge(&self, id: KnowledgeId) -> Option<Placement> {
        (**self).lookup_knowledge(id)
    }
}
